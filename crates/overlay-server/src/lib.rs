//! HTTP and `WebSocket` surface for the Overlay Hub.
//!
//! This crate mounts the notification core from `overlay-core` behind an
//! Axum server:
//!
//! - **Toggle endpoint** (`POST /api/overlay/{name}`) with lenient body
//!   decoding
//! - **Long-poll endpoint** (`GET /api/poll`) and an immediate
//!   `GET /api/state`
//! - **`WebSocket` endpoint** (`GET /ws`) that pushes the full state on
//!   connect and every change afterwards
//! - **Static collaborators**: `/`, `/admin`, and `/static/*` served
//!   from disk, with a cache-header policy per path class

pub mod cache;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::AppState;
