//! Wake-on-change primitive.
//!
//! [`ChangeSignal`] behaves like a manual-reset event shared by any
//! number of waiters. [`fire`](ChangeSignal::fire) sets the flag and wakes
//! everyone currently parked; a waiter that observes the flag clears it.
//! If nobody is waiting when it fires, the flag stays set until the next
//! waiter consumes it.
//!
//! Late arrivals may see a wake that belongs to an earlier fire. Callers
//! always re-check the state version after waking, so this is harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Why a call to [`ChangeSignal::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The signal fired (or was already set).
    Changed,
    /// The timeout elapsed first.
    TimedOut,
}

/// Manual-reset event that wakes all parked waiters at once.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    signaled: AtomicBool,
    notify: Notify,
}

impl ChangeSignal {
    /// Create an unsignaled event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal and wake every task currently parked in [`wait`](Self::wait).
    pub fn fire(&self) {
        self.signaled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Whether the signal is set and not yet consumed.
    pub fn is_set(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    /// Suspend until the signal fires or `timeout` elapses.
    ///
    /// Returns immediately with [`Wake::Changed`] if the signal is already
    /// set. Either way a `Changed` return clears the signal.
    pub async fn wait(&self, timeout: Duration) -> Wake {
        // Register interest before inspecting the flag so a fire() that
        // lands in between is not lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.signaled.swap(false, Ordering::AcqRel) {
            return Wake::Changed;
        }

        if tokio::time::timeout(timeout, notified).await.is_ok() {
            self.signaled.store(false, Ordering::Release);
            Wake::Changed
        } else {
            Wake::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_without_fire() {
        let signal = ChangeSignal::new();
        let started = tokio::time::Instant::now();

        let wake = signal.wait(Duration::from_millis(50)).await;

        assert_eq!(wake, Wake::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn fire_without_waiters_persists_until_consumed() {
        let signal = ChangeSignal::new();
        signal.fire();
        assert!(signal.is_set());

        assert_eq!(signal.wait(Duration::from_secs(5)).await, Wake::Changed);
        assert!(!signal.is_set());
        assert_eq!(
            signal.wait(Duration::from_millis(10)).await,
            Wake::TimedOut
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fire_wakes_every_parked_waiter() {
        let signal = Arc::new(ChangeSignal::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = Arc::clone(&signal);
                tokio::spawn(async move { signal.wait(Duration::from_secs(30)).await })
            })
            .collect();

        // Let every waiter park.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        signal.fire();

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap_or(Wake::TimedOut), Wake::Changed);
        }
    }
}
