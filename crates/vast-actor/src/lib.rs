//! The actor substrate shared by every VAST component: bounded mailboxes,
//! a restart-on-fault supervisor, a shared retry helper for the `io` error
//! kind, and the wire frame codec components speak over.
//!
//! Each component (Identifier, Archive, Index, Search, Receiver, Importer,
//! Exporter) is a [`tokio::task`] running an [`Actor`] behind a
//! [`Supervisor`]. Suspension happens only at mailbox receive; no actor
//! reaches into another's state directly (spec.md §5).

mod actor;
mod envelope;
mod mailbox;
mod retry;
mod supervisor;

pub use actor::{run, Actor, ActorError};
pub use envelope::{encode_frame, read_frame, write_frame, Envelope, FrameError, MAX_FRAME_LEN};
pub use mailbox::{channel, Address, Mailbox, MailboxClosed};
pub use retry::retry_once;
pub use supervisor::Supervisor;
