//! WebSocket message protocol definitions
//!
//! ## Client → Server Messages
//!
//! ```json
//! // Narrow delivery to some event kinds (empty = everything)
//! {"type": "subscribe", "kinds": ["order_control_updated", "custom_message_set"]}
//!
//! // Keepalive
//! {"type": "ping"}
//! ```
//!
//! ## Server → Client Messages
//!
//! ```json
//! {"type": "welcome", "connection_id": "conn_..."}
//! {"type": "event", "data": {"id": "...", "timestamp": "...", "tenantId": "...",
//!                            "event": {"kind": "...", "payload": {...}}}}
//! {"type": "subscribed", "kinds": [...]}
//! {"type": "pong"}
//! {"type": "error", "message": "..."}
//! ```

use crate::core::auth::AuthContext;
use crate::core::error::RequestError;
use crate::core::events::{EventEnvelope, StorefrontEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Only deliver events of these kinds; an empty list restores everything
    Subscribe {
        #[serde(default)]
        kinds: Vec<String>,
    },
    /// Keepalive ping
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// An event for this session
    Event { data: EventEnvelope },
    /// Kind filter confirmation
    Subscribed { kinds: Vec<String> },
    /// Keepalive response
    Pong,
    /// Error message
    Error { message: String },
    /// Welcome message on connection
    Welcome { connection_id: String },
}

/// Query string of the upgrade request
///
/// Browsers cannot set headers on a WebSocket handshake, so the identity
/// the gateway vouches for travels in the query: `tenant` plus exactly one
/// of `client` or `admin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionParams {
    pub tenant: Option<Uuid>,
    pub client: Option<Uuid>,
    pub admin: Option<Uuid>,
}

impl SessionParams {
    pub fn identity(&self) -> Result<AuthContext, RequestError> {
        let tenant_id = self.tenant.ok_or_else(|| RequestError::Unauthorized {
            message: "tenant is required".to_string(),
        })?;

        match (self.client, self.admin) {
            (Some(client_id), None) => Ok(AuthContext::Client {
                tenant_id,
                client_id,
            }),
            (None, Some(admin_id)) => Ok(AuthContext::Admin {
                tenant_id,
                admin_id,
            }),
            _ => Err(RequestError::Unauthorized {
                message: "exactly one of client or admin is required".to_string(),
            }),
        }
    }
}

/// Whether a session may see an event
///
/// Control events reach every session of the tenant. Submission
/// notifications reach the tenant's admins and the submitting client.
pub fn audience_includes(identity: &AuthContext, envelope: &EventEnvelope) -> bool {
    if identity.tenant_id() != envelope.tenant_id {
        return false;
    }

    match &envelope.event {
        StorefrontEvent::OrderControlUpdated { .. }
        | StorefrontEvent::CustomMessageSet { .. }
        | StorefrontEvent::CustomMessageCleared { .. } => true,
        StorefrontEvent::OrderSubmitted { client_id, .. } => {
            identity.is_admin() || identity.client_id() == Some(*client_id)
        }
    }
}

/// Per-session kind filter
#[derive(Debug, Clone, Default)]
pub struct KindFilter {
    kinds: Vec<String>,
}

impl KindFilter {
    pub fn new(kinds: Vec<String>) -> Self {
        Self { kinds }
    }

    pub fn matches(&self, event: &StorefrontEvent) -> bool {
        self.kinds.is_empty() || self.kinds.iter().any(|kind| kind == event.kind())
    }
}
