//! State-change notification core for the Overlay Hub.
//!
//! Clients toggle named boolean overlays; observers learn about changes
//! either by push or by long-poll. This crate holds everything that is
//! independent of HTTP:
//!
//! - [`VersionedState`] -- the current `(version, overlays)` snapshot,
//!   readable without locks
//! - [`ChangeSignal`] -- manual-reset event that wakes every waiter
//! - [`MutationGateway`] -- serialized write path (exclusive or
//!   independent toggles), bumps the version and fires the signal
//! - [`Broadcaster`] -- push registry, one queue per observer
//! - [`LongPoll`] -- pull responder with catch-up fast path
//! - [`Hub`] -- the context object tying them together
//!
//! [`VersionedState`]: state::VersionedState
//! [`ChangeSignal`]: signal::ChangeSignal
//! [`MutationGateway`]: gateway::MutationGateway
//! [`Broadcaster`]: broadcast::Broadcaster
//! [`LongPoll`]: poll::LongPoll

pub mod broadcast;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hub;
pub mod model;
pub mod poll;
pub mod signal;
pub mod state;

// Re-export primary types for convenience.
pub use config::{ConfigError, HubConfig};
pub use error::HubError;
pub use hub::Hub;
pub use model::{Mutation, ObserverId, OverlayState, PushMessage, Snapshot, ToggleMode, Version};
