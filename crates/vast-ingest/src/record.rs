//! A record an Importer has built but the Identifier has not yet stamped
//! with an id — the payload the Receiver batches and hands an id range to
//! (spec.md §4.9, "Importer ... builds events according to a declared
//! schema"; the id itself only exists once the Receiver has asked the
//! Identifier for one).

use vast_types::{Data, Event, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct UnidentifiedRecord {
    pub ty: Type,
    pub timestamp: i64,
    pub value: Data,
}

impl UnidentifiedRecord {
    pub fn new(ty: Type, timestamp: i64, value: Data) -> Self {
        UnidentifiedRecord { ty, timestamp, value }
    }

    /// Stamps this record with `id`, producing the immutable [`Event`] it
    /// becomes from here on.
    pub fn identify(self, id: u64) -> Event {
        Event::new(id, self.ty, self.timestamp, self.value)
    }
}
