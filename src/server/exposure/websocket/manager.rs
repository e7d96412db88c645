//! Connection manager for WebSocket sessions
//!
//! The `ConnectionManager` tracks every open session with the identity it
//! connected with. When an event arrives from the `EventBus`, it is fanned
//! out to the sessions in the event's audience whose kind filter matches.
//!
//! ```text
//! EventBus ──recv──▶ ConnectionManager::run_dispatch_loop()
//!                          │
//!                    for each connection
//!                          │
//!              audience_includes(identity, event)?
//!                    && filter.matches(event)?
//!                          │
//!                    ──yes──▶ send to session via mpsc channel
//! ```

use super::protocol::{KindFilter, ServerMessage, audience_includes};
use crate::core::auth::AuthContext;
use crate::core::events::EventEnvelope;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

struct ConnectionHandle {
    identity: AuthContext,
    /// Sender to push ServerMessage to the session's write loop
    tx: mpsc::UnboundedSender<ServerMessage>,
    filter: KindFilter,
}

/// Manages all active WebSocket sessions
///
/// Reads (dispatch) are frequent, writes (connect/disconnect/subscribe)
/// are rare.
pub struct ConnectionManager {
    connections: RwLock<HashMap<String, ConnectionHandle>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session
    ///
    /// Returns the connection id and the receiver of messages to forward.
    pub async fn connect(
        &self,
        identity: AuthContext,
    ) -> (String, mpsc::UnboundedReceiver<ServerMessage>) {
        let connection_id = format!("conn_{}", Uuid::new_v4().simple());
        let (tx, rx) = mpsc::unbounded_channel();

        self.connections.write().await.insert(
            connection_id.clone(),
            ConnectionHandle {
                identity,
                tx,
                filter: KindFilter::default(),
            },
        );

        tracing::debug!(
            connection_id = %connection_id,
            tenant_id = %identity.tenant_id(),
            admin = identity.is_admin(),
            "WebSocket session connected"
        );

        (connection_id, rx)
    }

    pub async fn disconnect(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);
        tracing::debug!(connection_id = %connection_id, "WebSocket session disconnected");
    }

    /// Replace the kind filter of a session
    pub async fn subscribe(&self, connection_id: &str, kinds: Vec<String>) -> Result<(), String> {
        let mut connections = self.connections.write().await;
        let conn = connections
            .get_mut(connection_id)
            .ok_or_else(|| format!("Connection {} not found", connection_id))?;

        conn.filter = KindFilter::new(kinds);
        Ok(())
    }

    /// Send a message to a specific session
    pub async fn send_to(&self, connection_id: &str, message: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(conn) = connections.get(connection_id) {
            // Receiver dropped means the session is closing
            let _ = conn.tx.send(message);
        }
    }

    /// Deliver an event to every session in its audience
    ///
    /// Returns the number of sessions it was queued for.
    pub(crate) async fn dispatch_event(&self, envelope: &EventEnvelope) -> usize {
        let connections = self.connections.read().await;
        let mut delivered = 0;

        for (connection_id, handle) in connections.iter() {
            if !audience_includes(&handle.identity, envelope)
                || !handle.filter.matches(&envelope.event)
            {
                continue;
            }

            let message = ServerMessage::Event {
                data: envelope.clone(),
            };
            if handle.tx.send(message).is_err() {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Failed to send event to session (likely disconnected)"
                );
                continue;
            }
            delivered += 1;
        }

        delivered
    }

    /// Run the event dispatch loop until the bus is dropped
    pub async fn run_dispatch_loop(&self, mut rx: broadcast::Receiver<EventEnvelope>) {
        tracing::info!("WebSocket dispatch loop started");

        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    self.dispatch_event(&envelope).await;
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    // Missed pushes are recovered by a full fetch on the session side
                    tracing::warn!(
                        count = count,
                        "WebSocket dispatch loop lagged, {} events skipped",
                        count
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("EventBus closed, stopping WebSocket dispatch loop");
                    break;
                }
            }
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
