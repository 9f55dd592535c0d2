//! Serialized write path for overlay state.
//!
//! Every mutation goes through [`MutationGateway::set_overlay`], which
//! performs the whole read-modify-write under one async mutex:
//!
//! 1. clone the current state and apply the toggle
//! 2. publish the new snapshot with `version + 1`
//! 3. fire the [`ChangeSignal`] once
//! 4. hand the [`Mutation`] to every registered [`ChangeSink`]
//!
//! Steps 3 and 4 run after the snapshot is visible, so anyone woken by
//! the signal reads the new version. Because sinks run inside the lock,
//! a sink sees mutations in version order.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::HubError;
use crate::model::{Mutation, Snapshot, ToggleMode};
use crate::signal::ChangeSignal;
use crate::state::VersionedState;

/// Receiver of applied mutations.
///
/// Called synchronously while the gateway holds its write lock, so
/// implementations must not block.
pub trait ChangeSink: Send + Sync {
    /// Called once per applied mutation, in version order.
    fn on_change(&self, mutation: &Mutation, snapshot: &Snapshot);
}

/// Applies toggles to [`VersionedState`] one at a time.
pub struct MutationGateway {
    mode: ToggleMode,
    state: Arc<VersionedState>,
    signal: Arc<ChangeSignal>,
    sinks: Vec<Arc<dyn ChangeSink>>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MutationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationGateway")
            .field("mode", &self.mode)
            .field("version", &self.state.version())
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl MutationGateway {
    /// Create a gateway over the given state and signal.
    pub fn new(mode: ToggleMode, state: Arc<VersionedState>, signal: Arc<ChangeSignal>) -> Self {
        Self {
            mode,
            state,
            signal,
            sinks: Vec::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Register a sink that is told about every subsequent mutation.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Set overlay `name` to `enabled` and return the resulting mutation.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EmptyName`] if `name` is empty and
    /// [`HubError::VersionExhausted`] if the version cannot advance. In
    /// both cases state, version, and signal are left untouched.
    pub async fn set_overlay(&self, name: &str, enabled: bool) -> Result<Mutation, HubError> {
        if name.is_empty() {
            return Err(HubError::EmptyName);
        }

        let _guard = self.write_lock.lock().await;

        let current = self.state.read();
        let version = current
            .version
            .checked_add(1)
            .ok_or(HubError::VersionExhausted {
                version: current.version,
            })?;

        let mut next = current.state.clone();
        next.apply(self.mode, name, enabled);
        let snapshot = Snapshot {
            version,
            state: next,
        };
        self.state.publish(snapshot.clone());
        self.signal.fire();

        let mutation = Mutation {
            name: name.to_owned(),
            on: enabled,
            version,
        };
        for sink in &self.sinks {
            sink.on_change(&mutation, &snapshot);
        }

        debug!(
            overlay = name,
            on = enabled,
            version,
            mode = ?self.mode,
            "Overlay state updated"
        );

        Ok(mutation)
    }
}
