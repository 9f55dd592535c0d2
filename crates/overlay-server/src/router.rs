//! Axum router construction.
//!
//! Assembles the API routes, the `WebSocket` endpoint, and the static
//! collaborators into a single [`Router`] with cache-header, CORS, and
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cache;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /api/overlay/{name}` -- toggle an overlay
/// - `GET /api/poll` -- long-poll for a newer state
/// - `GET /api/state` -- current state
/// - `GET /ws` -- `WebSocket` push channel
/// - `GET /` and `GET /admin` -- `index.html` / `admin.html` from the static dir
/// - `GET /static/*` -- files from the static dir
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.static_dir.clone();
    let max_age = state.static_max_age_secs;

    Router::new()
        // Entry documents
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/admin", ServeFile::new(static_dir.join("admin.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        // WebSocket
        .route("/ws", get(ws::ws_overlays))
        // REST API
        .route("/api/overlay/{name}", post(handlers::set_overlay))
        .route("/api/poll", get(handlers::poll))
        .route("/api/state", get(handlers::get_state))
        .layer(middleware::from_fn_with_state(max_age, cache::cache_headers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
