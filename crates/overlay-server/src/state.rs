//! Shared application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use overlay_core::{Hub, HubConfig};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// [`Hub`] is the notification core; the remaining fields are response
/// and static-file options taken from configuration.
#[derive(Debug)]
pub struct AppState {
    /// The notification core.
    pub hub: Arc<Hub>,
    /// Include `version` in toggle responses.
    pub include_version: bool,
    /// Directory holding the HTML entry documents and static assets.
    pub static_dir: PathBuf,
    /// `max-age` applied to `/static/` responses.
    pub static_max_age_secs: u32,
}

impl AppState {
    /// Build application state and a fresh hub from configuration.
    pub fn new(config: &HubConfig) -> Self {
        Self::with_hub(Arc::new(Hub::new(config)), config)
    }

    /// Build application state around an existing hub.
    pub fn with_hub(hub: Arc<Hub>, config: &HubConfig) -> Self {
        Self {
            hub,
            include_version: config.http.include_version,
            static_dir: PathBuf::from(&config.server.static_dir),
            static_max_age_secs: config.server.static_max_age_secs,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&HubConfig::default())
    }
}
