//! The Archive actor: accepts segments from the Receiver, serves id-range
//! lookups from Search, and is the sole owner of `archive/*.seg` files
//! (spec.md §5: "on-disk segment and partition files are owned
//! exclusively by Archive and Index respectively").

use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{info, warn};

use vast_actor::{Actor, ActorError};
use vast_types::Event;

use crate::error::ArchiveError;
use crate::segment::{Compression, Segment};
use crate::store::SegmentStore;

/// Messages accepted by the Archive actor.
pub enum Msg {
    /// Batches `events` into a segment, compresses, and persists it.
    StoreEvents {
        events: Vec<Event>,
        compression: Compression,
        reply: oneshot::Sender<Result<Arc<Segment>, ArchiveError>>,
    },
    /// Returns every segment overlapping `range`, in ascending order.
    Lookup {
        range: Range<u64>,
        reply: oneshot::Sender<Result<Vec<Arc<Segment>>, ArchiveError>>,
    },
    /// No-op: a stored segment is already durable, nothing to undo.
    Cancel,
}

pub struct Archive {
    store: SegmentStore,
}

impl Archive {
    pub async fn open(
        dir: impl Into<PathBuf>,
        max_segments: usize,
        max_segment_size: usize,
    ) -> Result<Self, ArchiveError> {
        Ok(Archive { store: SegmentStore::open(dir, max_segments, max_segment_size).await? })
    }
}

impl Actor for Archive {
    type Message = Msg;

    fn name(&self) -> &'static str {
        "archive"
    }

    async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
        match msg {
            Msg::StoreEvents { events, compression, reply } => {
                let result = self.store_events(events, compression).await;
                if let Err(err) = &result {
                    warn!(error = %err, "archive store failed");
                }
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Lookup { range, reply } => {
                let result = self.store.lookup(range).await;
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Cancel => Ok(()),
        }
    }
}

impl Archive {
    async fn store_events(
        &mut self,
        events: Vec<Event>,
        compression: Compression,
    ) -> Result<Arc<Segment>, ArchiveError> {
        let segment = Segment::build(&events, compression)?;
        if segment.byte_size() > self.store.max_segment_size() {
            warn!(
                size = segment.byte_size(),
                limit = self.store.max_segment_size(),
                "segment exceeds max-segment-size, storing anyway"
            );
        }
        let segment = Arc::new(segment);
        info!(segment = %segment.id, lo = segment.lo, hi = segment.hi, "archiving segment");
        self.store.store((*segment).clone()).await?;
        Ok(segment)
    }
}
