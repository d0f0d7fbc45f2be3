//! The Index component (spec.md §4.7, L7): partitioned bitmap indexes over
//! event attributes, answering candidate-id-set queries for a
//! type-resolved expression.

mod actor;
mod attribute;
mod compare;
mod error;
mod key;
mod partition;
mod store;
mod treemap;

pub use actor::{Index, Msg};
pub use attribute::AttributeIndex;
pub use compare::compare;
pub use error::IndexError;
pub use key::{index_key, IndexKey};
pub use partition::{Partition, PartitionState};
pub use store::PartitionStore;
