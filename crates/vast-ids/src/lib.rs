//! The Identifier component (spec.md §4.5, L5): a monotone counter handing
//! out disjoint id ranges to the Receiver, persisting before every
//! acknowledgement so a restart never reuses an id.

mod actor;
mod error;
mod state;

pub use actor::{Identifier, Msg};
pub use error::IdentifierError;
pub use state::IdentifierState;
