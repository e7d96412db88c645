//! Order control state owned by a tenant's administrators
//!
//! One [`OrderControlState`] exists per tenant. Administrators change it
//! through [`OrderControlPatch`]es (shallow, per-field overwrite) and the
//! single custom message slot. Every accepted change bumps `revision`, which
//! clients use to apply pushed fields monotonically.

use crate::core::window::{OrderWindowPolicy, PolicyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields of [`OrderControlState`] that can be patched independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlField {
    TimeControlEnabled,
    WarningEnabled,
    Policy,
    ShowSalePrice,
    ShowQuantity,
    CustomMessage,
}

impl ControlField {
    pub const ALL: [ControlField; 6] = [
        ControlField::TimeControlEnabled,
        ControlField::WarningEnabled,
        ControlField::Policy,
        ControlField::ShowSalePrice,
        ControlField::ShowQuantity,
        ControlField::CustomMessage,
    ];
}

/// Admin-owned ordering configuration for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderControlState {
    pub time_control_enabled: bool,
    pub warning_enabled: bool,
    pub policy: Option<OrderWindowPolicy>,
    pub show_sale_price: bool,
    pub show_quantity: bool,
    pub custom_message: Option<String>,
    pub custom_message_active: bool,
    pub custom_message_expires: Option<DateTime<Utc>>,
    /// Incremented on every accepted change
    pub revision: u64,
}

impl Default for OrderControlState {
    fn default() -> Self {
        Self {
            time_control_enabled: false,
            warning_enabled: true,
            policy: None,
            show_sale_price: true,
            show_quantity: true,
            custom_message: None,
            custom_message_active: false,
            custom_message_expires: None,
            revision: 0,
        }
    }
}

impl OrderControlState {
    /// The custom message, if one is set, active and not yet expired
    pub fn active_custom_message(&self, now: DateTime<Utc>) -> Option<&str> {
        if !self.custom_message_active {
            return None;
        }
        if self.custom_message_expires.is_some_and(|expires| expires <= now) {
            return None;
        }
        self.custom_message.as_deref()
    }

    /// Whether a message is still flagged active although its expiry passed
    pub fn custom_message_expired(&self, now: DateTime<Utc>) -> bool {
        self.custom_message_active
            && self
                .custom_message_expires
                .is_some_and(|expires| expires <= now)
    }

    /// Overwrite every field present in `patch`, leaving the others alone
    pub fn apply_patch(&mut self, patch: &OrderControlPatch) {
        if let Some(value) = patch.time_control_enabled {
            self.time_control_enabled = value;
        }
        if let Some(value) = patch.warning_enabled {
            self.warning_enabled = value;
        }
        if let Some(policy) = &patch.policy {
            self.policy = policy.clone();
        }
        if let Some(value) = patch.show_sale_price {
            self.show_sale_price = value;
        }
        if let Some(value) = patch.show_quantity {
            self.show_quantity = value;
        }
    }

    pub fn set_custom_message(&mut self, message: String, expires_at: Option<DateTime<Utc>>) {
        self.custom_message = Some(message);
        self.custom_message_active = true;
        self.custom_message_expires = expires_at;
    }

    pub fn clear_custom_message(&mut self) {
        self.custom_message = None;
        self.custom_message_active = false;
        self.custom_message_expires = None;
    }

    /// A patch carrying every patchable field of this state
    pub fn as_full_patch(&self) -> OrderControlPatch {
        OrderControlPatch {
            time_control_enabled: Some(self.time_control_enabled),
            warning_enabled: Some(self.warning_enabled),
            policy: Some(self.policy.clone()),
            show_sale_price: Some(self.show_sale_price),
            show_quantity: Some(self.show_quantity),
        }
    }
}

/// Partial update of [`OrderControlState`]
///
/// `policy` distinguishes "absent" (`None`) from "set to null"
/// (`Some(None)`), so a patch can remove the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderControlPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_control_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_enabled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub policy: Option<Option<OrderWindowPolicy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_sale_price: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_quantity: Option<bool>,
}

/// Present-but-null deserializes to `Some(None)`; absent stays `None` via `default`
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl OrderControlPatch {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Fields this patch touches
    pub fn fields(&self) -> Vec<ControlField> {
        let mut fields = Vec::new();
        if self.time_control_enabled.is_some() {
            fields.push(ControlField::TimeControlEnabled);
        }
        if self.warning_enabled.is_some() {
            fields.push(ControlField::WarningEnabled);
        }
        if self.policy.is_some() {
            fields.push(ControlField::Policy);
        }
        if self.show_sale_price.is_some() {
            fields.push(ControlField::ShowSalePrice);
        }
        if self.show_quantity.is_some() {
            fields.push(ControlField::ShowQuantity);
        }
        fields
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        match &self.policy {
            Some(Some(policy)) => policy.validate(),
            _ => Ok(()),
        }
    }
}
