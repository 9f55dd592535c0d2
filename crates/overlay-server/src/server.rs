//! HTTP server lifecycle management.
//!
//! [`start_server`] binds the configured address and serves until
//! `Ctrl-C`. [`serve`] runs on an already-bound listener with a
//! caller-supplied shutdown future, which is what tests use.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use overlay_core::HubConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
        }
    }
}

impl From<&HubConfig> for ServerConfig {
    fn from(config: &HubConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }
}

/// Start the HTTP server and run it until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    serve(listener, state, shutdown_signal()).await
}

/// Serve requests on `listener` until `shutdown` completes.
///
/// In-flight long-polls are allowed to finish; they are bounded by the
/// configured maximum poll timeout.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server fails while running.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no local address: {e}")))?;
    let router = build_router(state);

    info!(%addr, "Overlay hub listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Overlay hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
