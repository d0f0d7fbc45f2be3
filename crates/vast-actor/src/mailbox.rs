//! A mailbox is a bounded `tokio::sync::mpsc` channel. The bound is the
//! backpressure mechanism: a full mailbox makes upstream senders block at
//! `send`, throttling the sender instead of growing memory without limit.

use tokio::sync::mpsc;

/// The receiving half, owned by exactly one actor task.
pub struct Mailbox<M> {
    inner: mpsc::Receiver<M>,
}

impl<M> Mailbox<M> {
    pub async fn recv(&mut self) -> Option<M> {
        self.inner.recv().await
    }
}

/// The sending half ("address"). Cheap to clone; every clone can enqueue
/// into the same bounded mailbox.
#[derive(Clone)]
pub struct Address<M> {
    inner: mpsc::Sender<M>,
}

/// Error returned when a mailbox has been dropped (its actor has exited).
#[derive(Debug, thiserror::Error)]
#[error("mailbox closed: receiving actor has exited")]
pub struct MailboxClosed;

impl<M> Address<M> {
    /// Enqueues `msg`, waiting for space if the mailbox is full.
    pub async fn send(&self, msg: M) -> Result<(), MailboxClosed> {
        self.inner.send(msg).await.map_err(|_| MailboxClosed)
    }

    /// Enqueues `msg` without waiting; fails immediately if the mailbox is
    /// full or closed.
    pub fn try_send(&self, msg: M) -> Result<(), mpsc::error::TrySendError<M>> {
        self.inner.try_send(msg)
    }
}

/// Creates a bounded mailbox of the given capacity, returning the address
/// senders hold and the mailbox the owning actor task drains.
pub fn channel<M>(capacity: usize) -> (Address<M>, Mailbox<M>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Address { inner: tx }, Mailbox { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_recv_round_trip() {
        let (address, mut mailbox) = channel::<u32>(4);
        address.send(7).await.unwrap();
        assert_eq!(mailbox.recv().await, Some(7));
    }

    #[tokio::test]
    async fn recv_returns_none_once_every_address_is_dropped() {
        let (address, mut mailbox) = channel::<u32>(1);
        drop(address);
        assert_eq!(mailbox.recv().await, None);
    }

    #[tokio::test]
    async fn send_fails_once_mailbox_is_dropped() {
        let (address, mailbox) = channel::<u32>(1);
        drop(mailbox);
        assert!(address.send(1).await.is_err());
    }

    #[tokio::test]
    async fn try_send_fails_when_full() {
        let (address, mut mailbox) = channel::<u32>(1);
        address.try_send(1).unwrap();
        assert!(address.try_send(2).is_err());
        assert_eq!(mailbox.recv().await, Some(1));
    }
}
