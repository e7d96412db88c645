//! Administrator-owned order control state
//!
//! # Architecture
//!
//! ```text
//! admin PATCH ──▶ validate ──▶ merge into stored state ──▶ revision += 1 ──▶ ControlStore
//!                                                                   │
//!                                                                   └──▶ EventBus
//!                                                                        order_control_updated {updates, revision}
//! ```
//!
//! Writes for all tenants are serialized, so revisions of a tenant are
//! strictly increasing and match the order events are published in.

use crate::config::OrderingConfig;
use crate::core::clock::Clock;
use crate::core::control::{OrderControlPatch, OrderControlState};
use crate::core::error::{ControlError, OrderingResult};
use crate::core::events::{EventBus, StorefrontEvent};
use crate::core::service::ControlStore;
use crate::core::window::{WindowEvaluation, WindowEvaluator};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

/// `PUT /admin/order-control/message` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetCustomMessage {
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    /// No duration keeps the message until cleared
    #[validate(range(min = 1, max = 525_600))]
    pub duration_minutes: Option<u32>,
}

/// Client-visible control state plus the live window evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    pub state: OrderControlState,
    pub evaluation: WindowEvaluation,
}

pub struct ControlService {
    store: Arc<dyn ControlStore>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    defaults: OrderControlState,
    evaluator: WindowEvaluator,
    ordering: OrderingConfig,
    writes: Mutex<()>,
}

impl ControlService {
    pub fn new(
        store: Arc<dyn ControlStore>,
        event_bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
        defaults: OrderControlState,
        evaluator: WindowEvaluator,
        ordering: OrderingConfig,
    ) -> Self {
        Self {
            store,
            event_bus,
            clock,
            defaults,
            evaluator,
            ordering,
            writes: Mutex::new(()),
        }
    }

    /// Current state of a tenant; tenant defaults until an admin changes it
    pub async fn snapshot(&self, tenant_id: &Uuid) -> OrderingResult<OrderControlState> {
        let state = self.store.get(tenant_id).await?;
        Ok(state.unwrap_or_else(|| self.defaults.clone()))
    }

    /// Evaluate the tenant's live policy at the current local time
    pub async fn evaluate(
        &self,
        tenant_id: &Uuid,
    ) -> OrderingResult<(OrderControlState, WindowEvaluation)> {
        let state = self.snapshot(tenant_id).await?;
        let now = self.ordering.local_time(self.clock.now());
        let evaluation = self.evaluator.evaluate(
            state.policy.as_ref(),
            state.warning_enabled,
            state.time_control_enabled,
            now,
        );
        Ok((state, evaluation))
    }

    /// What a client sees: expired messages already inactive
    pub async fn client_snapshot(&self, tenant_id: &Uuid) -> OrderingResult<ControlSnapshot> {
        let (mut state, evaluation) = self.evaluate(tenant_id).await?;
        if state.custom_message_expired(self.clock.now()) {
            state.custom_message_active = false;
        }
        Ok(ControlSnapshot { state, evaluation })
    }

    /// Merge a partial update and broadcast exactly the fields it carried
    pub async fn patch(
        &self,
        tenant_id: &Uuid,
        patch: OrderControlPatch,
    ) -> OrderingResult<OrderControlState> {
        if patch.is_empty() {
            return Err(ControlError::EmptyPatch.into());
        }
        patch.validate()?;

        let _guard = self.writes.lock().await;
        let mut state = self.snapshot(tenant_id).await?;
        state.apply_patch(&patch);
        state.revision += 1;
        self.store.put(tenant_id, state.clone()).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            revision = state.revision,
            fields = ?patch.fields(),
            "Order control updated"
        );
        self.event_bus.publish(
            *tenant_id,
            StorefrontEvent::OrderControlUpdated {
                updates: patch,
                revision: state.revision,
            },
        );

        Ok(state)
    }

    /// Replace the single custom message slot
    pub async fn set_custom_message(
        &self,
        tenant_id: &Uuid,
        input: SetCustomMessage,
    ) -> OrderingResult<OrderControlState> {
        input.validate()?;
        let message = input.message.trim().to_string();
        if message.is_empty() {
            return Err(ControlError::EmptyMessage.into());
        }
        let expires_at = input
            .duration_minutes
            .map(|minutes| self.clock.now() + Duration::minutes(i64::from(minutes)));

        let _guard = self.writes.lock().await;
        let mut state = self.snapshot(tenant_id).await?;
        state.set_custom_message(message.clone(), expires_at);
        state.revision += 1;
        self.store.put(tenant_id, state.clone()).await?;

        tracing::info!(tenant_id = %tenant_id, revision = state.revision, "Custom message set");
        self.event_bus.publish(
            *tenant_id,
            StorefrontEvent::CustomMessageSet {
                message,
                expires_at,
                revision: state.revision,
            },
        );

        Ok(state)
    }

    pub async fn clear_custom_message(&self, tenant_id: &Uuid) -> OrderingResult<OrderControlState> {
        let _guard = self.writes.lock().await;
        let mut state = self.snapshot(tenant_id).await?;
        self.clear_locked(tenant_id, &mut state).await?;
        tracing::info!(tenant_id = %tenant_id, revision = state.revision, "Custom message cleared");
        Ok(state)
    }

    /// Back to tenant defaults; the revision keeps counting
    pub async fn reset(&self, tenant_id: &Uuid) -> OrderingResult<OrderControlState> {
        let _guard = self.writes.lock().await;
        let previous = self.snapshot(tenant_id).await?;

        let mut state = self.defaults.clone();
        state.revision = previous.revision + 1;
        self.store.put(tenant_id, state.clone()).await?;

        tracing::info!(tenant_id = %tenant_id, revision = state.revision, "Order control reset to defaults");
        self.event_bus.publish(
            *tenant_id,
            StorefrontEvent::OrderControlUpdated {
                updates: state.as_full_patch(),
                revision: state.revision,
            },
        );
        let event = match (&state.custom_message, state.custom_message_active) {
            (Some(message), true) => StorefrontEvent::CustomMessageSet {
                message: message.clone(),
                expires_at: state.custom_message_expires,
                revision: state.revision,
            },
            _ => StorefrontEvent::CustomMessageCleared {
                revision: state.revision,
            },
        };
        self.event_bus.publish(*tenant_id, event);

        Ok(state)
    }

    /// Clear every custom message whose expiry has passed
    ///
    /// Returns the number of tenants cleared.
    pub async fn sweep_expired(&self) -> OrderingResult<usize> {
        let now = self.clock.now();
        let mut cleared = 0;

        for tenant_id in self.store.tenants().await? {
            let _guard = self.writes.lock().await;
            let Some(mut state) = self.store.get(&tenant_id).await? else {
                continue;
            };
            if !state.custom_message_expired(now) {
                continue;
            }

            self.clear_locked(&tenant_id, &mut state).await?;
            tracing::info!(tenant_id = %tenant_id, revision = state.revision, "Expired custom message cleared");
            cleared += 1;
        }

        Ok(cleared)
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval`
    pub fn spawn_expiry_sweeper(self: Arc<Self>, interval: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_expired().await {
                    tracing::warn!(error = %e, "Custom message expiry sweep failed");
                }
            }
        })
    }

    async fn clear_locked(&self, tenant_id: &Uuid, state: &mut OrderControlState) -> OrderingResult<()> {
        state.clear_custom_message();
        state.revision += 1;
        self.store.put(tenant_id, state.clone()).await?;
        self.event_bus.publish(
            *tenant_id,
            StorefrontEvent::CustomMessageCleared {
                revision: state.revision,
            },
        );
        Ok(())
    }
}
