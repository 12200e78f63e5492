//! Live WebSocket endpoint
//!
//! GET /ws
//!
//! Protocol:
//! - Client → Server: [`ClientMessage`] (`joinAdmin`, `joinUser`)
//! - Server → Client: [`LiveEvent`] (`newOrder`, `orderStatusUpdated`, `orderDeleted`)
//!
//! A fresh connection receives nothing until it joins a room.

use super::AppState;
use crate::bus::{ClientMessage, ConnectionId, EventBus, LiveEvent, Room};
use crate::model::normalize_identity;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;

/// GET /ws
pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let bus = state.bus.clone();
    let ping_interval = state.ping_interval;
    ws.on_upgrade(move |socket| live_session(socket, bus, ping_interval))
}

async fn live_session(socket: WebSocket, bus: EventBus, ping_interval: Duration) {
    let (mut sink, mut stream) = socket.split();
    let (conn, mut events) = bus.connect();

    tracing::info!(connection = %conn, "Live client connected");

    let mut ping_interval = tokio::time::interval(ping_interval);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = events.recv() => {
                let Some(event) = event else { break };
                if send_event(&mut sink, &event).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_message(&bus, conn, text.as_str()) {
                            if sink.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    bus.on_disconnect(conn);
    tracing::info!(connection = %conn, "Live client disconnected");
}

/// Applies a join request. Returns an error frame for the client when it is rejected.
fn handle_client_message(bus: &EventBus, conn: ConnectionId, text: &str) -> Option<String> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(connection = %conn, error = %e, "Ignoring malformed client message");
            return Some(error_frame(&format!("malformed message: {e}")));
        }
    };

    let room = match message {
        ClientMessage::JoinAdmin => Room::Admin,
        ClientMessage::JoinUser { identity } => match normalize_identity(Some(identity.as_str())) {
            Some(identity) => Room::User(identity),
            None => return Some(error_frame("identity is required")),
        },
    };

    match bus.join(conn, room) {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(connection = %conn, error = %e, "Join rejected");
            Some(error_frame(&e.to_string()))
        }
    }
}

fn error_frame(message: &str) -> String {
    json!({ "event": "error", "data": { "message": message } }).to_string()
}

async fn send_event(sink: &mut SplitSink<WebSocket, Message>, event: &LiveEvent) -> Result<(), ()> {
    let json = serde_json::to_string(event).map_err(|e| {
        tracing::error!(event = event.name(), error = %e, "Failed to serialize live event");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
