//! The Index actor: maintains partitioned bitmap indexes over ingested
//! events and answers candidate-id-set queries (spec.md §4.7). On-disk
//! partition files under `<dir>/<uuid>/partition.bin` are owned
//! exclusively by this component.

use std::path::PathBuf;

use roaring::RoaringTreemap;
use tokio::sync::oneshot;
use tracing::warn;
use vast_actor::{Actor, ActorError};
use vast_expr::Expr;
use vast_types::Event;

use crate::error::IndexError;
use crate::store::PartitionStore;

/// Messages accepted by the Index actor.
pub enum Msg {
    /// Routes `events` into their type's active partition, sealing it if
    /// `max-events` is reached.
    Ingest { events: Vec<Event>, reply: oneshot::Sender<Result<(), IndexError>> },
    /// Evaluates a type-resolved expression across every partition,
    /// returning the union of matching ids.
    Query { expr: Expr, reply: oneshot::Sender<Result<RoaringTreemap, IndexError>> },
    /// Drops all partitions and re-ingests `events`, already paged from
    /// Archive in ascending id order by the caller.
    Rebuild { events: Vec<Event>, reply: oneshot::Sender<Result<(), IndexError>> },
    /// No-op: a sealed partition is already durable, nothing to undo.
    Cancel,
}

pub struct Index {
    store: PartitionStore,
}

impl Index {
    pub async fn open(
        dir: impl Into<PathBuf>,
        max_events: usize,
        max_parts: usize,
        active_parts: usize,
    ) -> Result<Self, IndexError> {
        Ok(Index { store: PartitionStore::open(dir, max_events, max_parts, active_parts).await? })
    }
}

impl Actor for Index {
    type Message = Msg;

    fn name(&self) -> &'static str {
        "index"
    }

    async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
        match msg {
            Msg::Ingest { events, reply } => {
                let result = self.store.ingest(events).await;
                if let Err(err) = &result {
                    warn!(error = %err, "index ingest failed");
                }
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Query { expr, reply } => {
                let result = self.store.query(&expr).await;
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Rebuild { events, reply } => {
                let result = self.store.rebuild(events).await;
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Cancel => Ok(()),
        }
    }
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
    async fn ingests_and_queries_through_the_actor() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::open(dir.path(), 1000, 8, 2).await.unwrap();
        let (address, mut mailbox) = vast_actor::channel::<Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut index, &mut mailbox).await;
        });

        let (tx, rx) = oneshot::channel();
        address.send(Msg::Ingest { events: vec![conn_event(0, 10)], reply: tx }).await.unwrap();
        rx.await.unwrap().unwrap();

        let expr = Expr::predicate(
            Operand::resolved(conn_type(), Offset::new(vec![0])),
            RelOp::Eq,
            Operand::data(Data::Count(10)),
        );
        let (tx, rx) = oneshot::channel();
        address.send(Msg::Query { expr, reply: tx }).await.unwrap();
        let ids = rx.await.unwrap().unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0]);
    }
}
