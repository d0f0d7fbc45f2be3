//! The Archive component (spec.md §4.6, L6): accepts compressed event
//! segments, caches recently-used ones in memory, and serves id-range
//! lookups by intersecting a request with the ranges of segments it has
//! stored.

mod actor;
mod error;
mod segment;
mod store;

pub use actor::{Archive, Msg};
pub use error::ArchiveError;
pub use segment::{Compression, Segment};
pub use store::SegmentStore;
