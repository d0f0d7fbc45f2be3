//! The Identifier actor. A single mailbox serializes every `request`, so
//! "Identifier guarantees its own responses are serialized" (spec.md §5)
//! falls directly out of the one-message-at-a-time actor model rather than
//! needing its own locking.

use std::ops::Range;
use std::path::PathBuf;

use tokio::sync::oneshot;

use vast_actor::{Actor, ActorError};

use crate::error::IdentifierError;
use crate::state::IdentifierState;

/// Messages accepted by the Identifier actor.
pub enum Msg {
    /// Reserves `n` ids; the actor persists the new counter value before
    /// replying.
    Request { n: u64, reply: oneshot::Sender<Result<Range<u64>, IdentifierError>> },
    /// No-op: an id reservation already persisted cannot be rolled back
    /// without risking reuse, so cancellation has nothing to undo here.
    Cancel,
}

pub struct Identifier {
    state: IdentifierState,
}

impl Identifier {
    pub async fn open(state_path: impl Into<PathBuf>) -> Result<Self, IdentifierError> {
        Ok(Identifier { state: IdentifierState::load_or_create(state_path).await? })
    }
}

impl Actor for Identifier {
    type Message = Msg;

    fn name(&self) -> &'static str {
        "identifier"
    }

    async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
        match msg {
            Msg::Request { n, reply } => {
                let state = &mut self.state;
                let result = vast_actor::retry_once(|| state.request(n)).await;
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

    #[tokio::test]
    async fn actor_serializes_requests_through_its_mailbox() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let mut identifier = Identifier::open(&path).await.unwrap();
        let (address, mut mailbox) = vast_actor::channel::<Msg>(8);
        tokio::spawn(async move {
            let _ = vast_actor::run(&mut identifier, &mut mailbox).await;
        });

        let (tx1, rx1) = oneshot::channel();
        address.send(Msg::Request { n: 4, reply: tx1 }).await.unwrap();
        let first = rx1.await.unwrap().unwrap();

        let (tx2, rx2) = oneshot::channel();
        address.send(Msg::Request { n: 6, reply: tx2 }).await.unwrap();
        let second = rx2.await.unwrap().unwrap();

        assert_eq!(first, 0..4);
        assert_eq!(second, 4..10);
    }
}
