//! `WebSocket` handler for live snapshots and operator commands.
//!
//! Clients connect to `GET /ws`. The first frame is always the full world
//! as it was at attach time; after that every published snapshot follows
//! in publish order, each as a `state_update` message. Text frames sent by
//! the client are parsed as [`Command`]s and applied; a frame that cannot
//! be applied gets a `command_error` reply and changes nothing.
//!
//! If a client falls behind, lagged snapshots are skipped and the client
//! resumes from the oldest snapshot still buffered.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};
use trinetra_core::Command;
use trinetra_types::WorldSnapshot;

use crate::state::AppState;

/// Messages sent from the server to a `WebSocket` client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    /// A full world snapshot, fields inlined next to `type`.
    StateUpdate(&'a WorldSnapshot),
    /// An inbound command was rejected.
    CommandError {
        /// Why the command was rejected.
        error: String,
    },
}

impl ServerMessage<'_> {
    /// Encode as a text frame.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_frame(&self) -> Result<Message, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(Message::Text(json.into()))
    }
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshots.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_snapshots(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Apply one inbound text frame. Returns the reply to send, if any.
pub async fn handle_command_frame(state: &AppState, text: &str) -> Option<ServerMessage<'static>> {
    let result = match Command::from_json(text) {
        Ok(command) => state.simulation.apply(command, Utc::now()).await.map(|_| ()),
        Err(e) => Err(e),
    };
    result.err().map(|e| {
        debug!(error = %e, "WebSocket command rejected");
        ServerMessage::CommandError {
            error: e.to_string(),
        }
    })
}

/// Handle the `WebSocket` lifecycle: forward every snapshot as a text
/// frame and apply inbound commands.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut subscription = state.subscribe().await;

    loop {
        tokio::select! {
            // Forward the next snapshot from the publisher.
            next = subscription.next() => {
                let Some(snapshot) = next else {
                    debug!("Snapshot channel closed, shutting down WebSocket");
                    return;
                };
                let frame = match ServerMessage::StateUpdate(&snapshot).to_frame() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Failed to serialize snapshot: {e}");
                        continue;
                    }
                };
                if socket.send(frame).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Inbound frames: commands, pings, or close.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Some(reply) = handle_command_frame(&state, text.as_str()).await else {
                            continue;
                        };
                        let Ok(frame) = reply.to_frame() else {
                            continue;
                        };
                        if socket.send(frame).await.is_err() {
                            debug!("WebSocket client disconnected (reply failed)");
                            return;
                        }
                    }
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
