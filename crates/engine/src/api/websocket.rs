//! WebSocket handling for observer connections.
//!
//! Observers get the latest stats on connect, every periodic stats push and
//! every reply the bot sends. Text they submit runs through the same command
//! pipeline as game chat, attributed to the relay speaker.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use minebot_protocol::{ClientMessage, ServerMessage};

use crate::api::dispatcher::ChatEvent;
use crate::api::session::respond_to_chat;
use crate::app::App;

/// Per-connection outbound buffer.
const CONNECTION_CHANNEL_BUFFER: usize = 64;

/// WebSocket upgrade handler - entry point for new connections.
///
/// The router must be served with `into_make_service_with_connect_info`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(app): State<Arc<App>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app, Some(peer.to_string())))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, app: Arc<App>, peer: Option<String>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    if let Some(stats) = app.stats.latest().await {
        let _ = tx.try_send(ServerMessage::Stats { stats });
    }
    app.connections
        .register(connection_id, peer.clone(), tx.clone())
        .await;

    tracing::info!(connection_id = %connection_id, peer = ?peer, "Observer connected");

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to serialize server message"),
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &app) {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let _ = tx.try_send(ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    });
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "Observer closed connection");
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    app.connections.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "Observer disconnected");
}

/// Handle a parsed observer message; returns the direct response, if any.
fn handle_message(msg: ClientMessage, app: &Arc<App>) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),
        ClientMessage::Chat { text } => {
            if text.trim().is_empty() {
                return Some(ServerMessage::Error {
                    code: "EMPTY_MESSAGE".to_string(),
                    message: "Chat text cannot be empty".to_string(),
                });
            }
            let event = ChatEvent::new(app.relay_speaker.clone(), text);
            tokio::spawn(respond_to_chat(app.clone(), event));
            None
        }
    }
}
