//! Error types for the notification core.
//!
//! Only two things can go wrong when mutating overlay state: the caller
//! supplied an empty overlay name, or the version counter ran out. Every
//! other failure mode in the core (malformed input, dead observers,
//! timeouts) is recovered locally and never surfaces as an error.

/// Errors returned by [`MutationGateway`](crate::gateway::MutationGateway).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The overlay name was the empty string.
    #[error("overlay name must not be empty")]
    EmptyName,

    /// The version counter reached `u64::MAX` and cannot advance.
    #[error("version counter exhausted at {version}")]
    VersionExhausted {
        /// The version that could not be incremented.
        version: u64,
    },
}
