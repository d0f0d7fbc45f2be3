//! A `Supervisor` is a thin wrapper around a restart closure: it owns a
//! factory for recreating an actor's state and keeps the actor's mailbox
//! alive across restarts, so messages queued during a restart are not
//! lost. Matches spec.md §7: "actor terminates and is (optionally)
//! restarted by its supervisor".

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor::{run, Actor};
use crate::mailbox::{channel, Address};

/// Supervises one actor, respawning it from `make_actor` whenever its run
/// loop returns an internal fault. `max_restarts` bounds how many times a
/// single supervisor will do this before giving up and letting the
/// mailbox drain silently (callers observe this as the address no longer
/// producing replies).
pub struct Supervisor {
    name: &'static str,
    mailbox_capacity: usize,
    max_restarts: Option<u64>,
    restarts: AtomicU64,
}

impl Supervisor {
    pub fn new(name: &'static str, mailbox_capacity: usize, max_restarts: Option<u64>) -> Self {
        Supervisor {
            name,
            mailbox_capacity,
            max_restarts,
            restarts: AtomicU64::new(0),
        }
    }

    /// Total number of restarts performed so far.
    pub fn restart_count(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Spawns the supervised run loop, calling `make_actor` once up front
    /// and again after every fault. Returns the address callers send
    /// messages to and the `JoinHandle` for the supervising task itself.
    pub fn spawn<A, F>(self, mut make_actor: F) -> (Address<A::Message>, JoinHandle<()>)
    where
        A: Actor,
        F: FnMut() -> A + Send + 'static,
    {
        let (address, mut mailbox) = channel(self.mailbox_capacity);
        let handle = tokio::spawn(async move {
            loop {
                let mut actor = make_actor();
                info!(actor = self.name, "actor starting");
                match run(&mut actor, &mut mailbox).await {
                    Ok(()) => break,
                    Err(fault) => {
                        let count = self.restarts.fetch_add(1, Ordering::SeqCst) + 1;
                        error!(actor = self.name, %fault, restarts = count, "actor faulted");
                        if self.max_restarts.is_some_and(|max| count >= max) {
                            error!(actor = self.name, "restart budget exhausted, giving up");
                            break;
                        }
                    }
                }
            }
        });
        (address, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorError;

    enum Msg {
        Fault,
        Ping,
    }

    struct Flaky {
        fault_once: bool,
    }

    impl Actor for Flaky {
        type Message = Msg;

        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn handle(&mut self, msg: Msg) -> Result<(), ActorError> {
            match msg {
                Msg::Fault if self.fault_once => Err(ActorError::new("transient")),
                Msg::Fault | Msg::Ping => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn restarts_after_a_fault_and_keeps_draining_the_same_mailbox() {
        let supervisor = Supervisor::new("flaky", 8, Some(5));
        let mut spawned = 0u32;
        let (address, handle) = supervisor.spawn(move || {
            spawned += 1;
            Flaky { fault_once: spawned == 1 }
        });
        address.send(Msg::Fault).await.unwrap();
        address.send(Msg::Ping).await.unwrap();
        drop(address);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn stops_restarting_once_the_budget_is_exhausted() {
        let supervisor = Supervisor::new("always-faulty", 8, Some(2));
        let (address, handle) = supervisor.spawn(|| Flaky { fault_once: true });
        for _ in 0..10 {
            let _ = address.try_send(Msg::Fault);
        }
        drop(address);
        handle.await.unwrap();
    }
}
