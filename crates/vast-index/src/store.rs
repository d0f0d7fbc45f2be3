//! Multi-partition lifecycle: the active set, the resident set, and the
//! lightweight summary index that lets a query or rebuild reach every
//! partition ever created, whether or not it is currently in memory
//! (spec.md §4.7).

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use lru::LruCache;
use roaring::RoaringTreemap;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;
use vast_expr::Expr;
use vast_types::Event;

use crate::error::IndexError;
use crate::partition::{Partition, PartitionState};

/// What the store remembers about a partition without holding its full
/// attribute indexes in memory.
#[derive(Debug, Clone, Copy)]
struct Summary {
    lo: u64,
    hi: u64,
    state: PartitionState,
}

pub struct PartitionStore {
    dir: PathBuf,
    max_events: usize,
    active_parts: usize,
    /// Live, mutable partitions currently accepting events.
    active: Vec<Partition>,
    /// Event type name -> index into `active`, assigned round-robin.
    assignment: HashMap<String, usize>,
    next_slot: usize,
    /// Sealed partitions kept warm in memory; evicted (without re-writing,
    /// since sealing already persisted them) once `max_parts` is exceeded.
    resident: LruCache<Uuid, Partition>,
    summaries: BTreeMap<Uuid, Summary>,
}

impl PartitionStore {
    pub async fn open(
        dir: impl Into<PathBuf>,
        max_events: usize,
        max_parts: usize,
        active_parts: usize,
    ) -> Result<Self, IndexError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| IndexError::Io { path: display(&dir), source })?;
        let capacity = NonZeroUsize::new(max_parts.max(1)).unwrap();
        let mut store = PartitionStore {
            dir,
            max_events: max_events.max(1),
            active_parts: active_parts.max(1),
            active: Vec::new(),
            assignment: HashMap::new(),
            next_slot: 0,
            resident: LruCache::new(capacity),
            summaries: BTreeMap::new(),
        };
        store.reindex_from_disk().await?;
        Ok(store)
    }

    async fn reindex_from_disk(&mut self) -> Result<(), IndexError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| IndexError::Io { path: display(&self.dir), source })?
        {
            let path = entry.path();
            let Some(id) = path.file_name().and_then(|n| n.to_str()).and_then(|n| n.parse::<Uuid>().ok())
            else {
                continue;
            };
            if let Ok(partition) = Partition::load(&self.dir, id).await {
                self.summaries.insert(
                    id,
                    Summary { lo: partition.lo, hi: partition.hi, state: PartitionState::Passive },
                );
            }
        }
        Ok(())
    }

    /// Ingests `events`, grouped by event type and routed to each type's
    /// round-robin-assigned active partition. Seals and evicts a partition
    /// to the resident set once it reaches `max-events`.
    pub async fn ingest(&mut self, events: Vec<Event>) -> Result<(), IndexError> {
        let mut by_type: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in events {
            let name = event.ty.name().unwrap_or("<anonymous>").to_string();
            by_type.entry(name).or_default().push(event);
        }
        for (type_name, events) in by_type {
            let slot = self.slot_for(&type_name);
            for event in events {
                self.active[slot].ingest(&event);
            }
            if self.active[slot].event_count() >= self.max_events {
                self.seal_slot(slot).await?;
            }
        }
        Ok(())
    }

    fn slot_for(&mut self, type_name: &str) -> usize {
        if let Some(&slot) = self.assignment.get(type_name) {
            return slot;
        }
        let slot = if self.active.len() < self.active_parts {
            let partition = Partition::new(Uuid::new_v4(), self.next_id_lo());
            self.active.push(partition);
            self.active.len() - 1
        } else {
            let slot = self.next_slot % self.active.len().max(1);
            self.next_slot = self.next_slot.wrapping_add(1);
            slot
        };
        self.assignment.insert(type_name.to_string(), slot);
        slot
    }

    fn next_id_lo(&self) -> u64 {
        self.summaries.values().map(|s| s.hi).chain(self.active.iter().map(|p| p.hi)).max().unwrap_or(0)
    }

    /// Seals the partition in `slot`, persists it, moves it into the
    /// resident set, and reassigns its type to a fresh active partition.
    async fn seal_slot(&mut self, slot: usize) -> Result<(), IndexError> {
        let mut sealed = std::mem::replace(&mut self.active[slot], Partition::new(Uuid::new_v4(), 0));
        sealed.seal();
        sealed.persist(&self.dir).await?;
        info!(partition = %sealed.id, events = sealed.event_count(), "sealed partition");
        self.summaries.insert(sealed.id, Summary { lo: sealed.lo, hi: sealed.hi, state: PartitionState::Passive });
        self.insert_resident(sealed.id, sealed);
        // The fresh active partition replacing this slot starts at the
        // current frontier, not id 0. Types already assigned to this slot
        // keep their assignment; only the partition underneath it changes.
        self.active[slot] = Partition::new(Uuid::new_v4(), self.next_id_lo());
        Ok(())
    }

    fn insert_resident(&mut self, id: Uuid, partition: Partition) {
        if self.resident.len() >= self.resident.cap().get() {
            self.resident.pop_lru();
        }
        self.resident.put(id, partition);
    }

    /// Evaluates `expr` against every known partition (active, resident,
    /// and passive partitions loaded from disk on demand), unioning the
    /// resulting candidate-id bitmaps.
    pub async fn query(&mut self, expr: &Expr) -> Result<RoaringTreemap, IndexError> {
        let mut out = RoaringTreemap::new();
        for partition in &self.active {
            out |= partition.evaluate(expr);
        }
        let ids: Vec<Uuid> = self.summaries.keys().copied().collect();
        for id in ids {
            let partition = self.load_passive(id).await?;
            out |= partition.evaluate(expr);
        }
        Ok(out)
    }

    async fn load_passive(&mut self, id: Uuid) -> Result<&Partition, IndexError> {
        if !self.resident.contains(&id) {
            let partition = Partition::load(&self.dir, id).await?;
            self.insert_resident(id, partition);
        }
        self.resident.get(&id).ok_or(IndexError::NotFound { id })
    }

    /// Drops every partition, active and resident, and re-ingests `events`
    /// (expected to be supplied in ascending id order by the caller, which
    /// has already paged them from Archive) from scratch.
    pub async fn rebuild(&mut self, events: Vec<Event>) -> Result<(), IndexError> {
        debug!(events = events.len(), "rebuilding index from archive");
        self.active.clear();
        self.assignment.clear();
        self.next_slot = 0;
        self.resident.clear();
        self.summaries.clear();
        self.ingest(events).await
    }
}

fn display(path: &std::path::Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_expr::{Operand, RelOp};
    use vast_types::{Data, Offset, RecordType, Type};

    fn conn_type() -> Type {
        Type::record(RecordType::new(vec![("bytes".to_string(), Type::count())])).named("conn")
    }

    fn conn_event(id: u64, bytes: u64) -> Event {
        Event::new(id, conn_type(), 0, Data::Record(vec![("bytes".to_string(), Data::Count(bytes))]))
    }

    #[tokio::test]
    async fn ingest_then_query_finds_matches() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionStore::open(dir.path(), 1000, 8, 2).await.unwrap();
        store.ingest(vec![conn_event(0, 10), conn_event(1, 20)]).await.unwrap();

        let expr = Expr::predicate(
            Operand::resolved(conn_type(), Offset::new(vec![0])),
            RelOp::Eq,
            Operand::data(Data::Count(10)),
        );
        let ids = store.query(&expr).await.unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[tokio::test]
    async fn seals_and_persists_once_max_events_is_reached() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionStore::open(dir.path(), 2, 8, 2).await.unwrap();
        store.ingest(vec![conn_event(0, 10), conn_event(1, 20)]).await.unwrap();
        assert_eq!(store.summaries.len(), 1);
    }

    #[tokio::test]
    async fn rebuild_clears_and_reingests() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionStore::open(dir.path(), 1000, 8, 2).await.unwrap();
        store.ingest(vec![conn_event(0, 10)]).await.unwrap();
        store.rebuild(vec![conn_event(5, 99)]).await.unwrap();

        let expr = Expr::predicate(
            Operand::resolved(conn_type(), Offset::new(vec![0])),
            RelOp::Eq,
            Operand::data(Data::Count(99)),
        );
        let ids = store.query(&expr).await.unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![5]);
    }
}
