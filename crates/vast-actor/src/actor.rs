//! The `Actor` trait and the run loop every component actor (Identifier,
//! Archive, Index, Search, Receiver, Importer, Exporter) is driven by.
//!
//! An actor suspends only at mailbox receive: `handle` runs to completion
//! for one message before the next is pulled off the mailbox, so an
//! actor's own state is never touched by more than one task at a time and
//! needs no internal locking.

use tracing::info;

use crate::mailbox::Mailbox;

/// Raised by a message handler when it hits a fault the actor cannot
/// recover from on its own. This is the only error kind the run loop acts
/// on directly; every other failure (parse, resolve, io, protocol — see
/// spec.md §7) is expected to be reported back to the caller through a
/// reply embedded in the message, not through this type.
#[derive(Debug, thiserror::Error)]
#[error("internal actor fault: {0}")]
pub struct ActorError(pub String);

impl ActorError {
    pub fn new(reason: impl Into<String>) -> Self {
        ActorError(reason.into())
    }
}

/// One component's message-handling behavior. `Self::Message` is typically
/// an enum with a `Cancel` variant; cancellation is handled like any other
/// message, not as a separate control path (spec.md §5).
pub trait Actor: Send + 'static {
    type Message: Send + 'static;

    /// Name used in `tracing` spans and supervisor log lines.
    fn name(&self) -> &'static str;

    /// Processes exactly one message. Returning `Err` terminates the run
    /// loop and, under a [`crate::Supervisor`], triggers a restart.
    fn handle(
        &mut self,
        msg: Self::Message,
    ) -> impl std::future::Future<Output = Result<(), ActorError>> + Send;
}

/// Drains `mailbox` into `actor` until the mailbox closes (every `Address`
/// dropped) or `handle` faults. Returns `Ok(())` on a clean shutdown and
/// `Err` on a fault, so callers (notably [`crate::Supervisor`]) can tell
/// the two apart.
pub async fn run<A: Actor>(actor: &mut A, mailbox: &mut Mailbox<A::Message>) -> Result<(), ActorError> {
    while let Some(msg) = mailbox.recv().await {
        actor.handle(msg).await?;
    }
    info!(actor = actor.name(), "mailbox closed, actor shutting down");
    Ok(())
}
