//! The Search actor: parses a query string, resolves it against the
//! current schema, fans out to Index and Archive, and streams matching
//! events back to the caller (spec.md §4.8).
//!
//! A query's heavy lifting runs in its own `tokio::task` rather than
//! inline in `handle`, so a `Cancel` for one query doesn't have to wait on
//! another query's mailbox turn to take effect — the task is simply
//! aborted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use vast_actor::{Actor, ActorError, Address};
use vast_expr::{Expr, QueryParser};
use vast_resolve::{schema_resolve, type_resolve};
use vast_schema::Schema;
use vast_types::Event;

use crate::error::SearchError;

/// Messages accepted by the Search actor.
pub enum Msg {
    /// Parses, resolves, and dispatches `text`, returning a handle the
    /// caller later passes to `Results`/`Cancel`. A parse or resolve
    /// failure is returned here directly; the actor itself stays live.
    Query {
        text: String,
        limit: Option<usize>,
        reply: oneshot::Sender<Result<Uuid, SearchError>>,
    },
    /// Hands over the result stream for a previously dispatched query.
    /// May only be called once per query id.
    Results {
        id: Uuid,
        reply: oneshot::Sender<Result<mpsc::Receiver<Result<Event, SearchError>>, SearchError>>,
    },
    /// Aborts the query's background task and drops its state.
    Cancel { id: Uuid },
    /// Atomically swaps in a newer schema snapshot for future queries.
    UpdateSchema(Arc<Schema>),
}

struct QueryHandle {
    task: JoinHandle<()>,
    receiver: Option<mpsc::Receiver<Result<Event, SearchError>>>,
}

pub struct Search {
    schema: Arc<Schema>,
    index: Address<vast_index::Msg>,
    archive: Address<vast_archive::Msg>,
    queries: HashMap<Uuid, QueryHandle>,
}

impl Search {
    pub fn new(schema: Arc<Schema>, index: Address<vast_index::Msg>, archive: Address<vast_archive::Msg>) -> Self {
        Search { schema, index, archive, queries: HashMap::new() }
    }

    fn dispatch(&mut self, text: &str, limit: Option<usize>) -> Result<Uuid, SearchError> {
        let expr = QueryParser::parse(text)?;
        let resolved = schema_resolve(&self.schema, &expr)?;

        let per_type: Vec<Expr> = self
            .schema
            .types()
            .iter()
            .map(|ty| type_resolve(ty, &resolved))
            .filter(|e| !e.is_none())
            .collect();
        let dispatch_expr = match per_type.len() {
            0 => Expr::none(),
            1 => per_type.into_iter().next().unwrap(),
            _ => Expr::disjunction(per_type),
        };

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(64);
        let index = self.index.clone();
        let archive = self.archive.clone();
        let task = tokio::spawn(run_query(dispatch_expr, resolved, limit, index, archive, tx));
        self.queries.insert(id, QueryHandle { task, receiver: Some(rx) });
        Ok(id)
    }
}

async fn run_query(
    dispatch_expr: Expr,
    filter_expr: Expr,
    limit: Option<usize>,
    index: Address<vast_index::Msg>,
    archive: Address<vast_archive::Msg>,
    tx: mpsc::Sender<Result<Event, SearchError>>,
) {
    if dispatch_expr.is_none() {
        return;
    }

    let (itx, irx) = oneshot::channel();
    if index.send(vast_index::Msg::Query { expr: dispatch_expr, reply: itx }).await.is_err() {
        let _ = tx.send(Err(SearchError::IndexUnavailable)).await;
        return;
    }
    let ids = match irx.await {
        Ok(Ok(ids)) => ids,
        Ok(Err(err)) => {
            let _ = tx.send(Err(err.into())).await;
            return;
        }
        Err(_) => {
            let _ = tx.send(Err(SearchError::IndexUnavailable)).await;
            return;
        }
    };
    if ids.is_empty() {
        return;
    }

    let range = ids.min().unwrap()..ids.max().unwrap() + 1;
    let (atx, arx) = oneshot::channel();
    if archive.send(vast_archive::Msg::Lookup { range, reply: atx }).await.is_err() {
        let _ = tx.send(Err(SearchError::ArchiveUnavailable)).await;
        return;
    }
    let segments = match arx.await {
        Ok(Ok(segments)) => segments,
        Ok(Err(err)) => {
            let _ = tx.send(Err(err.into())).await;
            return;
        }
        Err(_) => {
            let _ = tx.send(Err(SearchError::ArchiveUnavailable)).await;
            return;
        }
    };

    let mut emitted = 0usize;
    for segment in segments {
        let events = match segment.events() {
            Ok(events) => events,
            Err(err) => {
                let _ = tx.send(Err(err.into())).await;
                continue;
            }
        };
        for event in events {
            if !ids.contains(event.id) || !crate::eval::matches(&filter_expr, &event) {
                continue;
            }
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
            emitted += 1;
            if limit.is_some_and(|limit| emitted >= limit) {
                return;
            }
        }
    }
}

impl Actor for Search {
    type Message = Msg;

    fn name(&self) -> &'static str {
        "search"
    }

    async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
        match msg {
            Msg::Query { text, limit, reply } => {
                let result = self.dispatch(&text, limit);
                if let Err(err) = &result {
                    warn!(error = %err, "query rejected");
                }
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Results { id, reply } => {
                let result = match self.queries.get_mut(&id) {
                    Some(handle) => handle.receiver.take().ok_or(SearchError::NotFound { id }),
                    None => Err(SearchError::NotFound { id }),
                };
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Cancel { id } => {
                if let Some(handle) = self.queries.remove(&id) {
                    handle.task.abort();
                }
                Ok(())
            }
            Msg::UpdateSchema(schema) => {
                self.schema = schema;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_archive::{Archive, Compression};
    use vast_index::Index;
    use vast_types::{Data, RecordType, Type};

    fn conn_type() -> Type {
        Type::record(RecordType::new(vec![("bytes".to_string(), Type::count())])).named("conn")
    }

    async fn spawn_index() -> Address<vast_index::Msg> {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::open(dir.path(), 1000, 8, 2).await.unwrap();
        let (address, mut mailbox) = vast_actor::channel::<vast_index::Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut index, &mut mailbox).await;
        });
        std::mem::forget(dir);
        address
    }

    async fn spawn_archive() -> Address<vast_archive::Msg> {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::open(dir.path(), 8, 1 << 20).await.unwrap();
        let (address, mut mailbox) = vast_actor::channel::<vast_archive::Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut archive, &mut mailbox).await;
        });
        std::mem::forget(dir);
        address
    }

    #[tokio::test]
    async fn a_query_rehydrates_matching_events_end_to_end() {
        let schema = Arc::new(Schema::new(vec![conn_type()]).unwrap());
        let index = spawn_index().await;
        let archive = spawn_archive().await;

        let events =
            vec![Event::new(0, conn_type(), 0, Data::Record(vec![("bytes".to_string(), Data::Count(10))]))];

        let (itx, irx) = oneshot::channel();
        index.send(vast_index::Msg::Ingest { events: events.clone(), reply: itx }).await.unwrap();
        irx.await.unwrap().unwrap();

        let (atx, arx) = oneshot::channel();
        archive
            .send(vast_archive::Msg::StoreEvents { events, compression: Compression::None, reply: atx })
            .await
            .unwrap();
        arx.await.unwrap().unwrap();

        let mut search = Search::new(schema, index, archive);
        let (address, mut mailbox) = vast_actor::channel::<Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut search, &mut mailbox).await;
        });

        let (tx, rx) = oneshot::channel();
        address
            .send(Msg::Query { text: "bytes == 10".to_string(), limit: None, reply: tx })
            .await
            .unwrap();
        let query_id = rx.await.unwrap().unwrap();

        let (tx, rx) = oneshot::channel();
        address.send(Msg::Results { id: query_id, reply: tx }).await.unwrap();
        let mut results = rx.await.unwrap().unwrap();
        let first = results.recv().await.unwrap().unwrap();
        assert_eq!(first.id, 0);
    }

    #[tokio::test]
    async fn an_unparsable_query_is_rejected_without_killing_the_actor() {
        let schema = Arc::new(Schema::new(vec![conn_type()]).unwrap());
        let index = spawn_index().await;
        let archive = spawn_archive().await;
        let mut search = Search::new(schema, index, archive);
        let (address, mut mailbox) = vast_actor::channel::<Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut search, &mut mailbox).await;
        });

        let (tx, rx) = oneshot::channel();
        address.send(Msg::Query { text: "&&&".to_string(), limit: None, reply: tx }).await.unwrap();
        assert!(rx.await.unwrap().is_err());

        // Actor is still alive and can serve another query.
        let (tx, rx) = oneshot::channel();
        address
            .send(Msg::Query { text: "bytes == 10".to_string(), limit: None, reply: tx })
            .await
            .unwrap();
        assert!(rx.await.unwrap().is_ok());
    }
}
