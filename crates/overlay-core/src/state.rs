//! The single source of truth for overlay state.
//!
//! [`VersionedState`] holds the current [`Snapshot`] behind an
//! [`ArcSwap`]. Readers load the whole `(version, state)` pair in one
//! atomic pointer read and never take a lock, so they cannot observe a
//! version paired with the wrong state. Writes replace the snapshot
//! wholesale and are only reachable through the
//! [`MutationGateway`](crate::gateway::MutationGateway).

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::model::{Snapshot, Version};

/// Versioned overlay state with lock-free reads.
#[derive(Debug, Default)]
pub struct VersionedState {
    snap: ArcSwap<Snapshot>,
}

impl VersionedState {
    /// Create an empty state at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the current snapshot.
    #[inline]
    pub fn read(&self) -> Arc<Snapshot> {
        self.snap.load_full()
    }

    /// The current version.
    #[inline]
    pub fn version(&self) -> Version {
        self.snap.load().version
    }

    /// Publish a new snapshot. Callers must hold the gateway's write lock.
    pub(crate) fn publish(&self, snapshot: Snapshot) {
        self.snap.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverlayState, ToggleMode};

    #[test]
    fn starts_empty_at_version_zero() {
        let state = VersionedState::new();
        let snap = state.read();
        assert_eq!(snap.version, 0);
        assert!(snap.state.overlays.is_empty());
        assert_eq!(snap.state.active, None);
    }

    #[test]
    fn held_snapshot_is_unaffected_by_publish() {
        let state = VersionedState::new();
        let before = state.read();

        let mut next = OverlayState::default();
        next.apply(ToggleMode::Exclusive, "a", true);
        state.publish(Snapshot {
            version: 1,
            state: next,
        });

        assert_eq!(before.version, 0);
        assert!(before.state.overlays.is_empty());
        assert_eq!(state.version(), 1);
        assert!(state.read().state.is_on("a"));
    }
}
