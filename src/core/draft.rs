//! Draft order aggregate
//!
//! A client owns at most one [`DraftOrder`]: the mutable, not yet submitted
//! order. Its items are either listed (referencing a catalog product, with a
//! price snapshot taken when added) or unlisted (free-text description,
//! unpriced until an administrator annotates it).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a draft; a draft only ever exists as `DRAFT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    #[default]
    Draft,
}

/// What a line item refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemSource {
    Listed {
        #[serde(rename = "productId")]
        product_id: Uuid,
        #[serde(rename = "productName")]
        product_name: String,
    },
    Unlisted { description: String },
}

/// One line of a draft order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub source: ItemSource,
    /// Always at least 1
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl DraftOrderItem {
    pub fn listed(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        image_path: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: ItemSource::Listed {
                product_id,
                product_name: product_name.into(),
            },
            quantity,
            unit_price: Some(unit_price),
            image_path,
        }
    }

    pub fn unlisted(description: impl Into<String>, quantity: u32, image_path: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: ItemSource::Unlisted {
                description: description.into(),
            },
            quantity,
            unit_price: None,
            image_path,
        }
    }

    pub fn product_id(&self) -> Option<Uuid> {
        match &self.source {
            ItemSource::Listed { product_id, .. } => Some(*product_id),
            ItemSource::Unlisted { .. } => None,
        }
    }

    pub fn is_listed(&self) -> bool {
        matches!(self.source, ItemSource::Listed { .. })
    }

    /// `unit_price × quantity`, if priced
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price
            .map(|price| price * Decimal::from(self.quantity))
    }
}

/// The single in-progress order of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrder {
    /// Assigned when the draft is first persisted
    pub id: Option<Uuid>,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub status: DraftStatus,
    /// Insertion order is display order
    pub items: Vec<DraftOrderItem>,
    /// Bumped by the store on every save
    pub version: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DraftOrder {
    /// An empty, not yet persisted draft
    pub fn empty(tenant_id: Uuid, client_id: Uuid) -> Self {
        Self {
            id: None,
            tenant_id,
            client_id,
            status: DraftStatus::Draft,
            items: Vec::new(),
            version: 0,
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, item_id: &Uuid) -> Option<&DraftOrderItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &Uuid) -> Option<&mut DraftOrderItem> {
        self.items.iter_mut().find(|item| &item.id == item_id)
    }

    pub fn listed_item_mut(&mut self, product_id: &Uuid) -> Option<&mut DraftOrderItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id().as_ref() == Some(product_id))
    }

    pub fn remove_item(&mut self, item_id: &Uuid) -> Option<DraftOrderItem> {
        let index = self.items.iter().position(|item| &item.id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Σ quantity over all items
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Σ (unit price × quantity) over priced items only
    pub fn estimated_total(&self) -> Decimal {
        self.items.iter().filter_map(DraftOrderItem::line_total).sum()
    }

    /// Draft plus computed views; the total is only shown when sale prices are
    pub fn summary(self, show_sale_price: bool) -> DraftSummary {
        let total_items = self.total_items();
        let estimated_total = show_sale_price.then(|| self.estimated_total());

        DraftSummary {
            draft: self,
            total_items,
            estimated_total,
        }
    }
}

/// Response shape for draft reads and mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub draft: DraftOrder,
    pub total_items: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_total: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft_with_mixed_items() -> DraftOrder {
        let mut draft = DraftOrder::empty(Uuid::new_v4(), Uuid::new_v4());
        draft.items.push(DraftOrderItem::listed(
            Uuid::new_v4(),
            "Olive oil 5L",
            2,
            Decimal::new(1000, 2),
            None,
        ));
        draft
            .items
            .push(DraftOrderItem::unlisted("Custom crate of lemons", 1, None));
        draft
    }

    #[test]
    fn test_totals_exclude_unpriced_items() {
        let draft = draft_with_mixed_items();
        assert_eq!(draft.total_items(), 3);
        assert_eq!(draft.estimated_total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_summary_hides_total_without_sale_price() {
        let draft = draft_with_mixed_items();

        let shown = draft.clone().summary(true);
        assert_eq!(shown.estimated_total, Some(Decimal::new(2000, 2)));

        let hidden = draft.summary(false);
        assert_eq!(hidden.total_items, 3);
        assert!(hidden.estimated_total.is_none());
    }

    #[test]
    fn test_remove_item() {
        let mut draft = draft_with_mixed_items();
        let id = draft.items[0].id;

        assert!(draft.remove_item(&id).is_some());
        assert!(draft.item(&id).is_none());
        assert!(draft.remove_item(&id).is_none());
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn test_listed_item_lookup_by_product() {
        let mut draft = draft_with_mixed_items();
        let product_id = draft.items[0].product_id().unwrap();

        let item = draft.listed_item_mut(&product_id).unwrap();
        item.quantity += 3;
        assert_eq!(draft.total_items(), 6);
        assert!(draft.listed_item_mut(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_item_wire_shape() {
        let item = DraftOrderItem::unlisted("Blue pallets", 4, Some("images/a.jpg".to_string()));
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["kind"], "unlisted");
        assert_eq!(value["description"], "Blue pallets");
        assert_eq!(value["quantity"], 4);
        assert!(value.get("productId").is_none());
        assert!(value.get("unitPrice").is_none());

        let listed = DraftOrderItem::listed(Uuid::nil(), "Rice", 1, Decimal::new(250, 2), None);
        let value = serde_json::to_value(&listed).unwrap();
        assert_eq!(value["kind"], "listed");
        assert_eq!(value["productId"], json!(Uuid::nil()));
        assert_eq!(value["unitPrice"], "2.50");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_empty_draft_status() {
        let draft = DraftOrder::empty(Uuid::new_v4(), Uuid::new_v4());
        assert!(draft.is_empty());
        assert!(draft.id.is_none());
        assert_eq!(serde_json::to_value(draft.status).unwrap(), "DRAFT");
    }
}
