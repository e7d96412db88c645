//! WebSocket upgrade handler and message loop
//!
//! Each session gets:
//!
//! 1. A welcome message with its connection id
//! 2. A read loop that processes client messages (subscribe, ping)
//! 3. A write loop that forwards server messages to the socket

use super::manager::ConnectionManager;
use super::protocol::{ClientMessage, ServerMessage, SessionParams};
use crate::core::auth::AuthContext;
use crate::core::error::OrderingError;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::SinkExt;
use futures::stream::StreamExt;
use std::sync::Arc;

/// GET /ws?tenant=..&client=.. | &admin=..
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<SessionParams>,
    State(manager): State<Arc<ConnectionManager>>,
) -> Result<Response, OrderingError> {
    let identity = params.identity()?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, identity, manager)))
}

async fn handle_socket(socket: WebSocket, identity: AuthContext, manager: Arc<ConnectionManager>) {
    let (conn_id, mut server_rx) = manager.connect(identity).await;

    let (mut ws_write, mut ws_read) = socket.split();

    let welcome = ServerMessage::Welcome {
        connection_id: conn_id.clone(),
    };
    if let Ok(json) = serde_json::to_string(&welcome)
        && ws_write.send(Message::Text(json.into())).await.is_err()
    {
        manager.disconnect(&conn_id).await;
        return;
    }

    let conn_id_write = conn_id.clone();
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = server_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_write.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_write,
                            "WebSocket write failed, closing"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %conn_id_write,
                        error = %e,
                        "Failed to serialize ServerMessage"
                    );
                }
            }
        }
    });

    while let Some(result) = ws_read.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_message(&manager, &conn_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %conn_id, "Client sent close frame");
                break;
            }
            Ok(_) => {
                // axum answers pings; binary frames are ignored
            }
            Err(e) => {
                tracing::debug!(
                    connection_id = %conn_id,
                    error = %e,
                    "WebSocket read error"
                );
                break;
            }
        }
    }

    write_handle.abort();
    manager.disconnect(&conn_id).await;
}

async fn handle_client_message(manager: &ConnectionManager, connection_id: &str, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            let error_msg = ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            };
            manager.send_to(connection_id, error_msg).await;
            return;
        }
    };

    match msg {
        ClientMessage::Subscribe { kinds } => {
            let reply = match manager.subscribe(connection_id, kinds.clone()).await {
                Ok(()) => ServerMessage::Subscribed { kinds },
                Err(message) => ServerMessage::Error { message },
            };
            manager.send_to(connection_id, reply).await;
        }
        ClientMessage::Ping => {
            manager.send_to(connection_id, ServerMessage::Pong).await;
        }
    }
}
