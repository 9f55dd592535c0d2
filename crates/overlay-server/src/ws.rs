//! `WebSocket` push channel.
//!
//! Clients connect to `GET /ws`. The handler registers an observer with
//! the hub, which immediately queues a `state` message with the full
//! overlay map; every later mutation arrives as an `overlay` message.
//!
//! Inbound frames are read only to notice disconnection. Text and
//! binary frames are discarded; clients cannot mutate state over this
//! channel.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// pushing overlay changes.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_overlays(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: forward queued push messages as
/// text frames until either side goes away, then deregister.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut observer = state.hub.connect();
    let id = observer.id();
    debug!(observer = %id, "WebSocket client connected");

    loop {
        tokio::select! {
            // Forward the next queued push message.
            pushed = observer.recv() => {
                let Some(message) = pushed else {
                    debug!(observer = %id, "Observer deregistered, closing WebSocket");
                    break;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize push message: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(observer = %id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            // Keep-alive read loop: only watches for the client going away.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(observer = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(observer = %id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(observer = %id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore text, binary, and pong frames from the client.
                    }
                }
            }
        }
    }

    state.hub.disconnect(id);
}
