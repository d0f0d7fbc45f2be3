//! Named type bindings over the VAST type system.
//!
//! A [`Schema`] collects the named event types a store or query knows
//! about, keyed by name and alias, and supports suffix search for resolving
//! a bare field key (`id.orig_h`) against every type that declares it.

mod error;
mod load;
mod schema;

pub use error::SchemaError;
pub use schema::Schema;
