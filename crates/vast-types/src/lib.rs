//! The VAST type system: algebraic type descriptors and value-level data.
//!
//! - [`typ::Type`] / [`typ::congruent`] — types and shape-equivalence
//! - [`record::RecordType`] — ordered named fields, suffix search, leaf walk
//! - [`data::Data`] — tagged values mirroring `Type`
//! - [`offset::Offset`] — index paths into a record tree

mod data;
mod error;
mod event;
mod offset;
mod record;
mod typ;

pub use data::{Data, Port, Real, Subnet};
pub use error::TypeError;
pub use event::Event;
pub use offset::Offset;
pub use record::RecordType;
pub use typ::{congruent, Type, TypeKind};
