//! On-disk segment storage with an in-memory LRU cache.
//!
//! Segments live under `<dir>/archive/<uuid>.seg`, written with a
//! write-then-rename so a crash mid-write never leaves a half-written
//! file at the final path (the same pattern `vast-ids` uses for its
//! counter checkpoint). The `ranges` index tracks every segment's
//! `[lo, hi)` so `lookup` can find candidates without touching disk, and
//! enforces invariant (spec.md §4.6): stored ranges are pairwise disjoint.

use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use tokio::fs;
use uuid::Uuid;

use crate::error::ArchiveError;
use crate::segment::Segment;

pub struct SegmentStore {
    dir: PathBuf,
    /// Every stored segment's range, keyed by `lo` for ordered overlap
    /// scans; this index is never evicted, only the decoded payload is.
    ranges: BTreeMap<u64, (u64, Uuid)>,
    cache: LruCache<Uuid, Arc<Segment>>,
    max_segment_size: usize,
    /// Segments currently being read by an in-flight `lookup`, pinned
    /// against LRU eviction for the duration of that call.
    pinned: HashSet<Uuid>,
    faulted: HashSet<Uuid>,
}

impl SegmentStore {
    pub async fn open(
        dir: impl Into<PathBuf>,
        max_segments: usize,
        max_segment_size: usize,
    ) -> Result<Self, ArchiveError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| ArchiveError::Write {
            id: Uuid::nil(),
            path: display(&dir),
            source,
        })?;
        let capacity = NonZeroUsize::new(max_segments.max(1)).unwrap();
        let mut store = SegmentStore {
            dir,
            ranges: BTreeMap::new(),
            cache: LruCache::new(capacity),
            max_segment_size,
            pinned: HashSet::new(),
            faulted: HashSet::new(),
        };
        store.reindex_from_disk().await?;
        Ok(store)
    }

    /// Rebuilds the `ranges` index from `.seg` files already on disk, for
    /// the Index component's `rebuild` operation and for recovering after
    /// a restart.
    async fn reindex_from_disk(&mut self) -> Result<(), ArchiveError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };
        while let Some(entry) = entries.next_entry().await.map_err(|source| ArchiveError::Read {
            id: Uuid::nil(),
            path: display(&self.dir),
            source,
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("seg") {
                continue;
            }
            let bytes = fs::read(&path).await.map_err(|source| ArchiveError::Read {
                id: Uuid::nil(),
                path: display(&path),
                source,
            })?;
            let (segment, _): (Segment, usize) =
                bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                    .map_err(|source| ArchiveError::Decode { id: Uuid::nil(), source })?;
            self.ranges.insert(segment.lo, (segment.hi, segment.id));
        }
        Ok(())
    }

    fn segment_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.seg"))
    }

    /// Persists `segment`, checking disjointness against every previously
    /// stored range before writing a single byte.
    pub async fn store(&mut self, segment: Segment) -> Result<(), ArchiveError> {
        if let Some(&(_, id)) =
            self.ranges.iter().find(|(&lo, &(hi, _))| segment.lo < hi && lo < segment.hi).map(|(_, v)| v)
        {
            return Err(ArchiveError::OverlappingRange {
                new: segment.id,
                new_lo: segment.lo,
                new_hi: segment.hi,
                existing: id,
            });
        }
        let path = self.segment_path(segment.id);
        let tmp_path = path.with_extension("seg.tmp");
        let bytes = bincode::serde::encode_to_vec(&segment, bincode::config::standard())
            .map_err(|e| ArchiveError::Encode(e, segment.id))?;
        fs::write(&tmp_path, &bytes).await.map_err(|source| ArchiveError::Write {
            id: segment.id,
            path: display(&tmp_path),
            source,
        })?;
        fs::rename(&tmp_path, &path).await.map_err(|source| ArchiveError::Write {
            id: segment.id,
            path: display(&path),
            source,
        })?;
        self.ranges.insert(segment.lo, (segment.hi, segment.id));
        self.insert_cache(segment.id, Arc::new(segment));
        Ok(())
    }

    fn insert_cache(&mut self, id: Uuid, segment: Arc<Segment>) {
        // Evict the least-recently-used unpinned entry first, so a
        // segment being read by a concurrent lookup is never dropped out
        // from under it (spec.md §4.6 cache eviction rule).
        while self.cache.len() >= self.cache.cap().get() {
            let victim = self
                .cache
                .iter()
                .rev()
                .map(|(id, _)| *id)
                .find(|id| !self.pinned.contains(id));
            match victim {
                Some(id) => {
                    self.cache.pop(&id);
                }
                None => break,
            }
        }
        self.cache.put(id, segment);
    }

    /// Returns every stored segment overlapping `range`, in ascending
    /// `lo` order, loading from disk (with one retry) whenever the
    /// decoded segment has aged out of the cache.
    pub async fn lookup(&mut self, range: std::ops::Range<u64>) -> Result<Vec<Arc<Segment>>, ArchiveError> {
        let candidates: Vec<Uuid> = self
            .ranges
            .iter()
            .filter(|(lo, (hi, _))| **lo < range.end && range.start < *hi)
            .map(|(_, (_, id))| *id)
            .collect();

        for id in &candidates {
            self.pinned.insert(*id);
        }
        let mut out = Vec::with_capacity(candidates.len());
        for id in candidates {
            if self.faulted.contains(&id) {
                continue;
            }
            match self.load(id).await {
                Ok(segment) => out.push(segment),
                Err(_) => {
                    self.faulted.insert(id);
                }
            }
            self.pinned.remove(&id);
        }
        Ok(out)
    }

    async fn load(&mut self, id: Uuid) -> Result<Arc<Segment>, ArchiveError> {
        if let Some(segment) = self.cache.get(&id) {
            return Ok(segment.clone());
        }
        let path = self.segment_path(id);
        let bytes = vast_actor::retry_once(|| {
            let path = path.clone();
            async move {
                fs::read(&path).await.map_err(|source| ArchiveError::Read { id, path: display(&path), source })
            }
        })
        .await?;
        let (segment, _): (Segment, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|source| ArchiveError::Decode { id, source })?;
        let segment = Arc::new(segment);
        self.insert_cache(id, segment.clone());
        Ok(segment)
    }

    pub fn max_segment_size(&self) -> usize {
        self.max_segment_size
    }

    /// The union of every `[lo, hi)` range ever acknowledged by `store`,
    /// used to check the archive-wide coverage invariant in tests.
    #[cfg(test)]
    pub fn stored_ranges(&self) -> Vec<(u64, u64)> {
        self.ranges.values().map(|(hi, _)| *hi).zip(self.ranges.keys().copied())
            .map(|(hi, lo)| (lo, hi))
            .collect()
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_types::{Data, Event, Type};
    use crate::segment::Compression;

    fn event(id: u64) -> Event {
        Event::new(id, Type::count(), 0, Data::Count(id))
    }

    #[tokio::test]
    async fn stores_and_looks_up_a_segment() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::open(dir.path(), 8, 1 << 20).await.unwrap();
        let segment = Segment::build(&[event(0), event(1), event(2)], Compression::None).unwrap();
        store.store(segment).await.unwrap();

        let found = store.lookup(1..2).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].events().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn rejects_overlapping_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::open(dir.path(), 8, 1 << 20).await.unwrap();
        store.store(Segment::build(&[event(0), event(1)], Compression::None).unwrap()).await.unwrap();
        let err = store
            .store(Segment::build(&[event(1), event(2)], Compression::None).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::OverlappingRange { .. }));
    }

    #[tokio::test]
    async fn lookup_misses_non_overlapping_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::open(dir.path(), 8, 1 << 20).await.unwrap();
        store.store(Segment::build(&[event(0), event(1)], Compression::None).unwrap()).await.unwrap();
        let found = store.lookup(100..200).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn evicts_least_recently_used_unpinned_segment() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::open(dir.path(), 1, 1 << 20).await.unwrap();
        store.store(Segment::build(&[event(0)], Compression::None).unwrap()).await.unwrap();
        store.store(Segment::build(&[event(1)], Compression::None).unwrap()).await.unwrap();
        assert_eq!(store.cache.len(), 1);
    }

    #[tokio::test]
    async fn survives_reopening_and_reindexing_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SegmentStore::open(dir.path(), 8, 1 << 20).await.unwrap();
            store.store(Segment::build(&[event(0), event(1)], Compression::None).unwrap()).await.unwrap();
        }
        let mut reopened = SegmentStore::open(dir.path(), 8, 1 << 20).await.unwrap();
        let found = reopened.lookup(0..2).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
