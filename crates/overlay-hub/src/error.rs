//! Error types for the Overlay Hub binary.

/// Top-level error for the Overlay Hub binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum HubAppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: overlay_core::ConfigError,
    },

    /// The HTTP server failed to bind or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: overlay_server::ServerError,
    },
}
