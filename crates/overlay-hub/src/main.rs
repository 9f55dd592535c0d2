//! Overlay Hub binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `$OVERLAY_HUB_CONFIG` (default
//!    `overlay-hub.yaml`; a missing file means defaults)
//! 3. Build the hub context and application state
//! 4. Serve HTTP + `WebSocket` until `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use overlay_core::HubConfig;
use overlay_server::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::HubAppError;

const DEFAULT_CONFIG_PATH: &str = "overlay-hub.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the server
/// cannot bind.
#[tokio::main]
async fn main() -> Result<(), HubAppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("overlay-hub starting");

    // 2. Load configuration.
    let config_path = std::env::var("OVERLAY_HUB_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = HubConfig::load_or_default(&config_path)?;
    info!(
        path = %config_path.display(),
        mode = ?config.overlays.mode,
        include_version = config.http.include_version,
        default_poll_timeout_ms = config.poll.default_timeout_ms,
        max_poll_timeout_ms = config.poll.max_timeout_ms,
        static_dir = config.server.static_dir,
        "Configuration loaded"
    );

    // 3. Build shared state.
    let state = Arc::new(AppState::new(&config));

    // 4. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config);
    overlay_server::start_server(&server_config, state).await?;

    info!("overlay-hub exited cleanly");
    Ok(())
}
