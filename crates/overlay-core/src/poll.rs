//! Long-poll delivery.
//!
//! A poller tells us the last version it saw. If the state has moved on
//! we answer at once; otherwise the request parks on the
//! [`ChangeSignal`] until the version changes or the deadline passes.
//! A client holding a version from before a restart is ahead of the
//! server and is released by the first real change.
//! The answer is always the latest snapshot, never a diff, and polling
//! consumes nothing, so repeating a poll is safe.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::model::{Snapshot, Version};
use crate::signal::{ChangeSignal, Wake};
use crate::state::VersionedState;

/// Answers pull requests against the shared state.
#[derive(Debug, Clone)]
pub struct LongPoll {
    state: Arc<VersionedState>,
    signal: Arc<ChangeSignal>,
    max_timeout: Duration,
}

impl LongPoll {
    /// Create a long-poll responder. Requested timeouts are capped at `max_timeout`.
    pub const fn new(
        state: Arc<VersionedState>,
        signal: Arc<ChangeSignal>,
        max_timeout: Duration,
    ) -> Self {
        Self {
            state,
            signal,
            max_timeout,
        }
    }

    /// Clamp a caller-supplied timeout in milliseconds.
    ///
    /// Negative values mean "do not wait"; anything above the configured
    /// maximum is capped.
    pub fn clamp_timeout(&self, timeout_ms: i64) -> Duration {
        let ms = u64::try_from(timeout_ms).unwrap_or(0);
        Duration::from_millis(ms).min(self.max_timeout)
    }

    /// Return the current snapshot once it is newer than `since`, once the
    /// version changes while waiting, or when `timeout` elapses, whichever
    /// comes first.
    ///
    /// `since = -1` (or any value below the current version) returns
    /// immediately. A wake that leaves the version where it was is stale
    /// and the wait resumes for the remaining time.
    pub async fn poll(&self, since: i64, timeout: Duration) -> Arc<Snapshot> {
        let timeout = timeout.min(self.max_timeout);
        let deadline = Instant::now().checked_add(timeout);

        let snap = self.state.read();
        if is_behind(since, snap.version) {
            return snap;
        }
        let observed = snap.version;

        loop {
            let remaining = deadline
                .map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            if remaining.is_zero() {
                trace!(since, version = observed, "Long-poll timed out");
                return self.state.read();
            }

            match self.signal.wait(remaining).await {
                Wake::TimedOut => return self.state.read(),
                Wake::Changed => {
                    let current = self.state.read();
                    if current.version != observed {
                        return current;
                    }
                    trace!(since, version = observed, "Stale wake, waiting again");
                }
            }
        }
    }
}

/// Whether a client that last saw `since` is behind `current`.
fn is_behind(since: i64, current: Version) -> bool {
    match u64::try_from(since) {
        Ok(since) => since < current,
        // Negative: the client has seen nothing yet.
        Err(_) => true,
    }
}
