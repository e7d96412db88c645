//! Internal event system for real-time notifications
//!
//! The EventBus decouples mutations (admin control changes, submissions)
//! from delivery (WebSocket sessions, admin listeners). It uses
//! `tokio::sync::broadcast`: one-to-many, best-effort, no acknowledgement.
//!
//! # Architecture
//!
//! ```text
//! ControlService ──┐
//!                  ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ WebSocket sessions
//! SubmissionGate ──┘                                              ──▶ admin listeners
//! ```
//!
//! Every event is a typed `{kind, payload}` envelope; adding a kind is a
//! compile-checked change for every exhaustive handler.

use crate::core::control::OrderControlPatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events pushed to the sessions of a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum StorefrontEvent {
    /// Partial control state change, applied by shallow field overwrite
    OrderControlUpdated {
        updates: OrderControlPatch,
        revision: u64,
    },
    /// The tenant's custom message was set
    CustomMessageSet {
        message: String,
        expires_at: Option<DateTime<Utc>>,
        revision: u64,
    },
    /// The tenant's custom message was cleared or expired
    CustomMessageCleared { revision: u64 },
    /// A client submitted an order (notification only, never a gating signal)
    OrderSubmitted {
        order_id: Uuid,
        order_number: String,
        client_id: Uuid,
        item_count: usize,
    },
}

impl StorefrontEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StorefrontEvent::OrderControlUpdated { .. } => "order_control_updated",
            StorefrontEvent::CustomMessageSet { .. } => "custom_message_set",
            StorefrontEvent::CustomMessageCleared { .. } => "custom_message_cleared",
            StorefrontEvent::OrderSubmitted { .. } => "order_submitted",
        }
    }

    /// Control revision carried by the event, if it is a control event
    pub fn revision(&self) -> Option<u64> {
        match self {
            StorefrontEvent::OrderControlUpdated { revision, .. }
            | StorefrontEvent::CustomMessageSet { revision, .. }
            | StorefrontEvent::CustomMessageCleared { revision } => Some(*revision),
            StorefrontEvent::OrderSubmitted { .. } => None,
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Tenant whose sessions receive the event
    pub tenant_id: Uuid,
    /// The actual event
    pub event: StorefrontEvent,
}

impl EventEnvelope {
    pub fn new(tenant_id: Uuid, event: StorefrontEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            tenant_id,
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (the sender is shared) and safe to use across threads.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Without subscribers the event is dropped. Returns the
    /// number of receivers that will see it.
    pub fn publish(&self, tenant_id: Uuid, event: StorefrontEvent) -> usize {
        tracing::debug!(tenant_id = %tenant_id, kind = event.kind(), "Publishing event");
        let envelope = EventEnvelope::new(tenant_id, event);
        // send() returns Err only if there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
