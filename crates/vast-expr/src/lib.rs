//! The expression AST and its surface grammars.
//!
//! - [`ast::Expr`] — the sum-of-products query tree
//! - [`query::QueryParser`] — parses a query string into an [`ast::Expr`]
//! - [`duration::parse_duration`] / [`timepoint::parse_time_point`] —
//!   literal grammars shared by the query parser and the CLI
//! - [`glob::glob_to_regex`] — glob literal translation

mod ast;
mod duration;
mod error;
mod glob;
mod query;
mod timepoint;

pub use ast::{Expr, Extractor, Operand, Predicate, RelOp};
pub use duration::parse_duration;
pub use error::ExprError;
pub use glob::glob_to_regex;
pub use query::{tokenize, QueryParser, Token};
pub use timepoint::{now_ns, parse_time_point};
