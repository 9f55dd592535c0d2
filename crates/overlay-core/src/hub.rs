//! The explicitly constructed context object shared by request handlers.
//!
//! A [`Hub`] owns one [`VersionedState`] and one [`ChangeSignal`] and
//! wires them into the [`MutationGateway`], the push [`Broadcaster`],
//! and the [`LongPoll`] responder. It is built once at startup and
//! passed around behind an [`Arc`].

use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::{Broadcaster, Observer};
use crate::config::HubConfig;
use crate::error::HubError;
use crate::gateway::{ChangeSink, MutationGateway};
use crate::model::{Mutation, ObserverId, Snapshot};
use crate::poll::LongPoll;
use crate::signal::ChangeSignal;
use crate::state::VersionedState;

/// Shared notification core.
#[derive(Debug)]
pub struct Hub {
    state: Arc<VersionedState>,
    gateway: MutationGateway,
    broadcaster: Arc<Broadcaster>,
    poll: LongPoll,
    default_poll_timeout: Duration,
}

impl Hub {
    /// Build a hub from configuration.
    pub fn new(config: &HubConfig) -> Self {
        let state = Arc::new(VersionedState::new());
        let signal = Arc::new(ChangeSignal::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&state)));
        let gateway = MutationGateway::new(
            config.overlays.mode,
            Arc::clone(&state),
            Arc::clone(&signal),
        )
        .with_sink(Arc::clone(&broadcaster) as Arc<dyn ChangeSink>);
        let poll = LongPoll::new(
            Arc::clone(&state),
            signal,
            Duration::from_millis(config.poll.max_timeout_ms),
        );

        Self {
            state,
            gateway,
            broadcaster,
            poll,
            default_poll_timeout: Duration::from_millis(config.poll.default_timeout_ms),
        }
    }

    /// Current snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        self.state.read()
    }

    /// Toggle an overlay through the gateway.
    ///
    /// # Errors
    ///
    /// See [`MutationGateway::set_overlay`].
    pub async fn set_overlay(&self, name: &str, enabled: bool) -> Result<Mutation, HubError> {
        self.gateway.set_overlay(name, enabled).await
    }

    /// Long-poll for a snapshot newer than `since`.
    pub async fn poll(&self, since: i64, timeout: Duration) -> Arc<Snapshot> {
        self.poll.poll(since, timeout).await
    }

    /// Clamp a requested poll timeout; `None` selects the configured default.
    pub fn poll_timeout(&self, timeout_ms: Option<i64>) -> Duration {
        timeout_ms.map_or(self.default_poll_timeout, |ms| {
            self.poll.clamp_timeout(ms)
        })
    }

    /// Register a push observer.
    pub fn connect(&self) -> Observer {
        self.broadcaster.connect()
    }

    /// Deregister a push observer. Safe to call more than once.
    pub fn disconnect(&self, id: ObserverId) -> bool {
        self.broadcaster.disconnect(id)
    }

    /// Number of connected push observers.
    pub fn observer_count(&self) -> usize {
        self.broadcaster.observer_count()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(&HubConfig::default())
    }
}
