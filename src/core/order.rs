//! Submitted orders

use crate::core::draft::DraftOrderItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a submitted order; advanced by administrators only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Submitted,
    Processing,
    Completed,
}

/// Immutable order produced from a draft at submission
///
/// `items` is a frozen copy of the draft lines; prices and quantities are
/// never re-derived afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<DraftOrderItem>,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn estimated_total(&self) -> Decimal {
        self.items.iter().filter_map(DraftOrderItem::line_total).sum()
    }
}
