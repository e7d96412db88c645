//! Client-side view of a tenant's order control state
//!
//! A session keeps a [`ControlView`] built from a full fetch and folds
//! pushed events into it. Each field remembers the revision it was last
//! written at; an update carrying an older or equal revision for that field
//! is dropped, so out-of-order delivery never rolls a field back.
//!
//! The view is a rendering hint. Whether a submission is accepted is only
//! ever decided by the server.

use crate::core::control::{ControlField, OrderControlPatch, OrderControlState};
use crate::core::events::StorefrontEvent;
use crate::core::window::{WindowEvaluation, WindowEvaluator};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

/// What applying an event changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewChange {
    pub applied: Vec<ControlField>,
    /// The policy changed; the advisory must be recomputed now rather than
    /// on the next local tick
    pub policy_changed: bool,
}

impl ViewChange {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ControlView {
    state: OrderControlState,
    revisions: HashMap<ControlField, u64>,
    evaluator: WindowEvaluator,
}

impl ControlView {
    pub fn new(snapshot: OrderControlState) -> Self {
        Self::with_evaluator(snapshot, WindowEvaluator::default())
    }

    pub fn with_evaluator(snapshot: OrderControlState, evaluator: WindowEvaluator) -> Self {
        let revisions = stamp_all(snapshot.revision);
        Self {
            state: snapshot,
            revisions,
            evaluator,
        }
    }

    pub fn state(&self) -> &OrderControlState {
        &self.state
    }

    pub fn field_revision(&self, field: ControlField) -> u64 {
        self.revisions.get(&field).copied().unwrap_or(0)
    }

    /// Fold one pushed event into the view
    pub fn apply(&mut self, event: &StorefrontEvent) -> ViewChange {
        let mut change = ViewChange::default();

        match event {
            StorefrontEvent::OrderControlUpdated { updates, revision } => {
                for field in updates.fields() {
                    if !self.accept(field, *revision) {
                        continue;
                    }
                    self.state.apply_patch(&single_field(updates, field));
                    change.applied.push(field);
                    if field == ControlField::Policy {
                        change.policy_changed = true;
                    }
                }
            }
            StorefrontEvent::CustomMessageSet {
                message,
                expires_at,
                revision,
            } => {
                if self.accept(ControlField::CustomMessage, *revision) {
                    self.state.set_custom_message(message.clone(), *expires_at);
                    change.applied.push(ControlField::CustomMessage);
                }
            }
            StorefrontEvent::CustomMessageCleared { revision } => {
                if self.accept(ControlField::CustomMessage, *revision) {
                    self.state.clear_custom_message();
                    change.applied.push(ControlField::CustomMessage);
                }
            }
            StorefrontEvent::OrderSubmitted { .. } => {}
        }

        if let Some(revision) = event.revision()
            && !change.is_empty()
        {
            self.state.revision = self.state.revision.max(revision);
        }

        change
    }

    /// Merge a full fetch, field by field
    ///
    /// A field already written by a push newer than the snapshot keeps its
    /// local value, so a fetch answered after a push cannot undo it.
    pub fn reconcile(&mut self, snapshot: OrderControlState) -> ViewChange {
        let mut change = ViewChange::default();

        for field in ControlField::ALL {
            if snapshot.revision < self.field_revision(field) {
                continue;
            }
            self.revisions.insert(field, snapshot.revision);
            if differs(&self.state, &snapshot, field) {
                copy_field(&mut self.state, &snapshot, field);
                change.applied.push(field);
                if field == ControlField::Policy {
                    change.policy_changed = true;
                }
            }
        }
        self.state.revision = self.state.revision.max(snapshot.revision);

        change
    }

    /// Local evaluation for rendering the submit button and advisory
    pub fn submit_hint(&self, now: NaiveDateTime) -> WindowEvaluation {
        self.evaluator.evaluate(
            self.state.policy.as_ref(),
            self.state.warning_enabled,
            self.state.time_control_enabled,
            now,
        )
    }

    pub fn custom_message(&self, now: DateTime<Utc>) -> Option<&str> {
        self.state.active_custom_message(now)
    }

    fn accept(&mut self, field: ControlField, revision: u64) -> bool {
        if revision <= self.field_revision(field) {
            return false;
        }
        self.revisions.insert(field, revision);
        true
    }
}

fn stamp_all(revision: u64) -> HashMap<ControlField, u64> {
    ControlField::ALL
        .into_iter()
        .map(|field| (field, revision))
        .collect()
}

fn single_field(patch: &OrderControlPatch, field: ControlField) -> OrderControlPatch {
    let mut single = OrderControlPatch::default();
    match field {
        ControlField::TimeControlEnabled => single.time_control_enabled = patch.time_control_enabled,
        ControlField::WarningEnabled => single.warning_enabled = patch.warning_enabled,
        ControlField::Policy => single.policy = patch.policy.clone(),
        ControlField::ShowSalePrice => single.show_sale_price = patch.show_sale_price,
        ControlField::ShowQuantity => single.show_quantity = patch.show_quantity,
        ControlField::CustomMessage => {}
    }
    single
}

fn copy_field(target: &mut OrderControlState, source: &OrderControlState, field: ControlField) {
    match field {
        ControlField::TimeControlEnabled => target.time_control_enabled = source.time_control_enabled,
        ControlField::WarningEnabled => target.warning_enabled = source.warning_enabled,
        ControlField::Policy => target.policy = source.policy.clone(),
        ControlField::ShowSalePrice => target.show_sale_price = source.show_sale_price,
        ControlField::ShowQuantity => target.show_quantity = source.show_quantity,
        ControlField::CustomMessage => {
            target.custom_message = source.custom_message.clone();
            target.custom_message_active = source.custom_message_active;
            target.custom_message_expires = source.custom_message_expires;
        }
    }
}

fn differs(a: &OrderControlState, b: &OrderControlState, field: ControlField) -> bool {
    match field {
        ControlField::TimeControlEnabled => a.time_control_enabled != b.time_control_enabled,
        ControlField::WarningEnabled => a.warning_enabled != b.warning_enabled,
        ControlField::Policy => a.policy != b.policy,
        ControlField::ShowSalePrice => a.show_sale_price != b.show_sale_price,
        ControlField::ShowQuantity => a.show_quantity != b.show_quantity,
        ControlField::CustomMessage => {
            a.custom_message != b.custom_message
                || a.custom_message_active != b.custom_message_active
                || a.custom_message_expires != b.custom_message_expires
        }
    }
}
