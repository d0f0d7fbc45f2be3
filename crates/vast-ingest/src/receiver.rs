//! The Receiver: batches incoming records into segments of up to
//! `batch-size` events, requests the id range for each batch from the
//! Identifier, and ships the resulting segment to Archive and Index in
//! parallel (spec.md §4.9, data flow in §2: "Importer → Receiver →
//! (Identifier stamps IDs) → Archive + Index (in parallel)").
//!
//! A partial batch sits buffered until either it fills up or a caller asks
//! for `Flush` (the Importer does this once at end-of-input so the last,
//! possibly short, batch is not silently dropped).

use tokio::sync::oneshot;
use tracing::info;

use vast_actor::{Actor, ActorError, Address};
use vast_archive::Compression;

use crate::error::IngestError;
use crate::record::UnidentifiedRecord;

/// Messages accepted by the Receiver actor.
pub enum Msg {
    /// Appends `records` to the buffer, flushing every full `batch_size`
    /// chunk immediately. Replies with the number of events durably
    /// archived and indexed as a result of this call (0 if everything fit
    /// in the still-open partial batch).
    Submit {
        records: Vec<UnidentifiedRecord>,
        reply: oneshot::Sender<Result<usize, IngestError>>,
    },
    /// Flushes whatever is left in the partial batch, however small.
    Flush { reply: oneshot::Sender<Result<usize, IngestError>> },
    /// Drops the buffered partial batch without flushing it — in-flight
    /// work is dropped, not rolled back (spec.md §5).
    Cancel,
}

pub struct Receiver {
    buffer: Vec<UnidentifiedRecord>,
    batch_size: usize,
    compression: Compression,
    identifier: Address<vast_ids::Msg>,
    archive: Address<vast_archive::Msg>,
    index: Address<vast_index::Msg>,
}

impl Receiver {
    pub fn new(
        batch_size: usize,
        compression: Compression,
        identifier: Address<vast_ids::Msg>,
        archive: Address<vast_archive::Msg>,
        index: Address<vast_index::Msg>,
    ) -> Self {
        Receiver { buffer: Vec::new(), batch_size: batch_size.max(1), compression, identifier, archive, index }
    }

    async fn submit(&mut self, records: Vec<UnidentifiedRecord>) -> Result<usize, IngestError> {
        self.buffer.extend(records);
        let mut flushed = 0;
        while self.buffer.len() >= self.batch_size {
            let batch: Vec<UnidentifiedRecord> = self.buffer.drain(..self.batch_size).collect();
            flushed += self.flush_batch(batch).await?;
        }
        Ok(flushed)
    }

    async fn flush_remainder(&mut self) -> Result<usize, IngestError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut self.buffer);
        self.flush_batch(batch).await
    }

    async fn flush_batch(&mut self, batch: Vec<UnidentifiedRecord>) -> Result<usize, IngestError> {
        let n = batch.len();
        if n == 0 {
            return Ok(0);
        }
        let range = self.request_ids(n as u64).await?;
        let events: Vec<vast_types::Event> = batch
            .into_iter()
            .zip(range)
            .map(|(record, id)| record.identify(id))
            .collect();

        let (archive_tx, archive_rx) = oneshot::channel();
        self.archive
            .send(vast_archive::Msg::StoreEvents {
                events: events.clone(),
                compression: self.compression,
                reply: archive_tx,
            })
            .await?;
        let (index_tx, index_rx) = oneshot::channel();
        self.index.send(vast_index::Msg::Ingest { events, reply: index_tx }).await?;

        let segment = archive_rx.await.map_err(|_| IngestError::NoReply("archive"))??;
        index_rx.await.map_err(|_| IngestError::NoReply("index"))??;

        info!(segment = %segment.id, count = n, "receiver flushed batch");
        Ok(n)
    }

    async fn request_ids(&self, n: u64) -> Result<std::ops::Range<u64>, IngestError> {
        let (tx, rx) = oneshot::channel();
        self.identifier.send(vast_ids::Msg::Request { n, reply: tx }).await?;
        Ok(rx.await.map_err(|_| IngestError::NoReply("identifier"))??)
    }
}

impl Actor for Receiver {
    type Message = Msg;

    fn name(&self) -> &'static str {
        "receiver"
    }

    async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
        match msg {
            Msg::Submit { records, reply } => {
                let result = self.submit(records).await;
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Flush { reply } => {
                let result = self.flush_remainder().await;
                let _ = reply.send(result);
                Ok(())
            }
            Msg::Cancel => {
                self.buffer.clear();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_archive::Archive;
    use vast_index::Index;
    use vast_types::{Data, RecordType, Type};

    fn conn_type() -> Type {
        Type::record(RecordType::new(vec![("bytes".to_string(), Type::count())])).named("conn")
    }

    fn record(bytes: u64) -> UnidentifiedRecord {
        UnidentifiedRecord::new(conn_type(), 0, Data::Record(vec![("bytes".to_string(), Data::Count(bytes))]))
    }

    async fn spawn_receiver(batch_size: usize) -> Address<Msg> {
        let dir = tempfile::tempdir().unwrap();

        let mut identifier = vast_ids::Identifier::open(dir.path().join("state")).await.unwrap();
        let (identifier_addr, mut identifier_mailbox) = vast_actor::channel::<vast_ids::Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut identifier, &mut identifier_mailbox).await;
        });

        let mut archive = Archive::open(dir.path().join("archive"), 8, 1 << 20).await.unwrap();
        let (archive_addr, mut archive_mailbox) = vast_actor::channel::<vast_archive::Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut archive, &mut archive_mailbox).await;
        });

        let mut index = Index::open(dir.path().join("index"), 1000, 8, 2).await.unwrap();
        let (index_addr, mut index_mailbox) = vast_actor::channel::<vast_index::Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut index, &mut index_mailbox).await;
        });

        let mut receiver = Receiver::new(batch_size, Compression::None, identifier_addr, archive_addr, index_addr);
        let (address, mut mailbox) = vast_actor::channel::<Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut receiver, &mut mailbox).await;
        });
        std::mem::forget(dir);
        address
    }

    #[tokio::test]
    async fn flushes_full_batches_immediately() {
        let address = spawn_receiver(2).await;
        let (tx, rx) = oneshot::channel();
        address
            .send(Msg::Submit { records: vec![record(1), record(2), record(3)], reply: tx })
            .await
            .unwrap();
        // one full batch of 2 flushed, one record left buffered
        assert_eq!(rx.await.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn flush_drains_a_partial_batch() {
        let address = spawn_receiver(10).await;
        let (tx, rx) = oneshot::channel();
        address.send(Msg::Submit { records: vec![record(1)], reply: tx }).await.unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 0);

        let (tx, rx) = oneshot::channel();
        address.send(Msg::Flush { reply: tx }).await.unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_drops_the_buffered_partial_batch() {
        let address = spawn_receiver(10).await;
        let (tx, rx) = oneshot::channel();
        address.send(Msg::Submit { records: vec![record(1)], reply: tx }).await.unwrap();
        rx.await.unwrap().unwrap();

        address.send(Msg::Cancel).await.unwrap();

        let (tx, rx) = oneshot::channel();
        address.send(Msg::Flush { reply: tx }).await.unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 0);
    }
}
