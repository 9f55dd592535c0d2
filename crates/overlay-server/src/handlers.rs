//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/overlay/{name}` | Toggle an overlay |
//! | `GET` | `/api/poll` | Long-poll for a newer state |
//! | `GET` | `/api/state` | Current state without waiting |
//!
//! # Lenient decode
//!
//! The toggle body is `{"on": bool}`. A missing `on`, a non-boolean
//! `on`, or a body that is not a JSON object at all is read as
//! `on: false`. This is a coercion policy, not validation: the request
//! still succeeds and still bumps the version.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use overlay_core::{OverlayState, Snapshot, Version};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/overlay/{name}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ToggleRequest {
    /// Requested flag. Anything but a JSON boolean reads as `false`.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub on: bool,
}

impl ToggleRequest {
    /// Decode a raw request body, coercing anything malformed to `on: false`.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => Self::deserialize(value).unwrap_or_default(),
            Ok(other) => {
                debug!(body = %other, "Toggle body is not an object, treating as off");
                Self::default()
            }
            Err(e) => {
                debug!(error = %e, "Toggle body is not JSON, treating as off");
                Self::default()
            }
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Response body for `POST /api/overlay/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// The overlay that was toggled.
    pub name: String,
    /// The flag that was applied.
    pub on: bool,
    /// Resulting version, when enabled in configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

/// Query parameters for `GET /api/poll`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PollQuery {
    /// Last version the client saw (default `-1`, i.e. nothing yet).
    #[serde(default = "default_since")]
    pub since: i64,
    /// Maximum wait in milliseconds (default from configuration).
    pub timeout_ms: Option<i64>,
}

const fn default_since() -> i64 {
    -1
}

/// Response body for `GET /api/poll` and `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateResponse {
    /// Version of the returned state.
    pub version: Version,
    /// The overlay state.
    pub state: OverlayState,
}

impl From<&Snapshot> for StateResponse {
    fn from(snap: &Snapshot) -> Self {
        Self {
            version: snap.version,
            state: snap.state.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/overlay/{name}
// ---------------------------------------------------------------------------

/// Toggle an overlay and report the applied flag.
pub async fn set_overlay(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToggleResponse>, ApiError> {
    let request = ToggleRequest::from_body(&body);
    let mutation = state.hub.set_overlay(&name, request.on).await?;

    info!(
        overlay = %mutation.name,
        on = mutation.on,
        version = mutation.version,
        "Overlay toggled"
    );

    Ok(Json(ToggleResponse {
        ok: true,
        name: mutation.name,
        on: mutation.on,
        version: state.include_version.then_some(mutation.version),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/poll
// ---------------------------------------------------------------------------

/// Long-poll: answer at once if the client is behind, otherwise wait for
/// a change or the timeout and return whatever is current.
pub async fn poll(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Json<StateResponse> {
    let timeout = state.hub.poll_timeout(query.timeout_ms);
    let snap = state.hub.poll(query.since, timeout).await;
    Json(StateResponse::from(snap.as_ref()))
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Current state, never waits.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse::from(state.hub.read().as_ref()))
}
