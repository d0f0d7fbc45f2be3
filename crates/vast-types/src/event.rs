//! The unit of storage and retrieval: an immutable, ID-stamped, typed
//! record (spec.md glossary, "Event").

use serde::{Deserialize, Serialize};

use crate::{Data, Type};

/// `{id, type, timestamp, value}`. Created once by an Importer, ID-stamped
/// by the Identifier, and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub ty: Type,
    /// Nanoseconds since the Unix epoch, matching [`crate::Data::Time`]'s
    /// resolution.
    pub timestamp: i64,
    pub value: Data,
}

impl Event {
    pub fn new(id: u64, ty: Type, timestamp: i64, value: Data) -> Self {
        Event { id, ty, timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_every_field_accessible() {
        let event = Event::new(7, Type::count(), 0, Data::Count(42));
        assert_eq!(event.id, 7);
        assert_eq!(event.value, Data::Count(42));
    }
}
