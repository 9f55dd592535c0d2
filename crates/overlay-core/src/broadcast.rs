//! Push delivery to connected observers.
//!
//! The [`Broadcaster`] keeps a registry of live observers, each with its
//! own bounded queue. Broadcasting enqueues the message for every
//! observer in turn; an observer whose queue is closed (the connection
//! task has gone away) or full (the client stopped reading) is dropped
//! from the registry during that same call. Failures are never reported
//! to the caller.
//!
//! Per-observer order matches the order of `broadcast` calls. There is
//! no atomicity across observers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::gateway::ChangeSink;
use crate::model::{Mutation, ObserverId, PushMessage, Snapshot};
use crate::state::VersionedState;

/// Messages one observer may have queued before it counts as dead.
const OBSERVER_QUEUE_CAPACITY: usize = 256;

type Registry = HashMap<ObserverId, mpsc::Sender<PushMessage>>;

/// Registry of push observers.
#[derive(Debug)]
pub struct Broadcaster {
    state: Arc<VersionedState>,
    observers: Mutex<Registry>,
}

/// The receiving end held by one connection.
#[derive(Debug)]
pub struct Observer {
    id: ObserverId,
    rx: mpsc::Receiver<PushMessage>,
}

impl Observer {
    /// This observer's registry key.
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next pushed message. Returns `None` once deregistered.
    pub async fn recv(&mut self) -> Option<PushMessage> {
        self.rx.recv().await
    }

    /// Take a pending message without waiting.
    pub fn try_recv(&mut self) -> Option<PushMessage> {
        self.rx.try_recv().ok()
    }
}

impl Broadcaster {
    /// Create an empty registry that reads catch-up state from `state`.
    pub fn new(state: Arc<VersionedState>) -> Self {
        Self {
            state,
            observers: Mutex::new(HashMap::new()),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new observer and queue the full current state for it.
    ///
    /// The snapshot is read under the registry lock, so any mutation
    /// published afterwards is also broadcast to this observer.
    pub fn connect(&self) -> Observer {
        let id = ObserverId::new();
        let (tx, rx) = mpsc::channel(OBSERVER_QUEUE_CAPACITY);

        let count = {
            let mut observers = self.registry();
            let initial = PushMessage::State(self.state.read().state.clone());
            if let Err(e) = tx.try_send(initial) {
                debug!(observer = %id, error = %e, "Initial state not queued");
            }
            observers.insert(id, tx);
            observers.len()
        };

        debug!(observer = %id, observers = count, "Observer connected");
        Observer { id, rx }
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ObserverId) -> bool {
        let removed = self.registry().remove(&id).is_some();
        if removed {
            debug!(observer = %id, "Observer disconnected");
        }
        removed
    }

    /// Queue `message` for every observer, dropping any whose queue is
    /// closed or full.
    ///
    /// Returns the number of observers the message was delivered to.
    pub fn broadcast(&self, message: &PushMessage) -> usize {
        let mut observers = self.registry();
        let before = observers.len();
        observers.retain(|id, tx| match tx.try_send(message.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(observer = %id, "Observer queue full, deregistering");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(observer = %id, "Observer send failed, deregistering");
                false
            }
        });
        let delivered = observers.len();
        if delivered < before {
            debug!(
                dropped = before.saturating_sub(delivered),
                remaining = delivered,
                "Dead observers removed during broadcast"
            );
        }
        delivered
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.registry().len()
    }
}

impl ChangeSink for Broadcaster {
    fn on_change(&self, mutation: &Mutation, _snapshot: &Snapshot) {
        let delivered = self.broadcast(&PushMessage::from(mutation));
        debug!(version = mutation.version, delivered, "Overlay change pushed");
    }
}
