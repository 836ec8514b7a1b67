//! `WebSocket` handler for real-time game event streaming.
//!
//! Clients connect to `GET /ws/events` and receive one JSON-encoded
//! [`GameEvent`] per state change. `?player_id=` restricts the stream to
//! one player. The handler uses a [`broadcast::Receiver`] so every client
//! sees the same stream.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the most recent event.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use outpost_types::{GameEvent, PlayerId};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handlers::parse_uuid;
use crate::state::AppState;

/// Query parameters for `GET /ws/events`.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Only forward events for this player.
    pub player_id: Option<String>,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming game events.
///
/// # Route
///
/// `GET /ws/events`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params
        .player_id
        .as_deref()
        .map(parse_uuid)
        .transpose()?
        .map(PlayerId::from);
    let rx = state.subscribe();
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, rx, filter)))
}

/// Whether `event` passes the optional player filter.
pub fn wanted(event: &GameEvent, filter: Option<PlayerId>) -> bool {
    filter.is_none_or(|id| event.player_id() == id)
}

/// Handle the `WebSocket` lifecycle: forward each matching event as a
/// text frame until either side goes away.
async fn handle_ws(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<GameEvent>,
    filter: Option<PlayerId>,
) {
    debug!(?filter, "WebSocket client connected");

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !wanted(&event, filter) {
                            continue;
                        }
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize game event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
