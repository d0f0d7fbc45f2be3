//! The Search component (spec.md §4.8, L8): parses a query string,
//! resolves it against the current schema, and orchestrates Index and
//! Archive to stream matching events back to the caller.

mod actor;
mod error;
mod eval;

pub use actor::{Msg, Search};
pub use error::SearchError;
