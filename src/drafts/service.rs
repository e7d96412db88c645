//! Draft order operations
//!
//! Every operation loads the client's single draft, applies one change and
//! saves it back. Input is validated before anything is read or written.

use crate::core::draft::{DraftOrder, DraftOrderItem, ItemSource};
use crate::core::error::{DraftError, OrderingResult, StockError, ValidationError};
use crate::core::service::{ImageStorage, OrderingStore, ProductCatalog};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const MAX_QUANTITY: i64 = 1_000_000;

/// `POST /draft/items` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddListedItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1_000_000, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

/// Uploaded image attached to an unlisted item
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// `POST /draft/items/unlisted` form
#[derive(Debug, Clone, Validate)]
pub struct AddUnlistedItem {
    #[validate(custom(function = "not_blank", message = "description must not be empty"))]
    pub description: String,
    #[validate(range(min = 1, max = 1_000_000, message = "quantity must be at least 1"))]
    pub quantity: i64,
    pub image: Option<ImageUpload>,
}

/// `PUT /draft/items/{itemId}` body; below 1 removes the item
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemQuantity {
    pub quantity: i64,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

fn to_quantity(quantity: i64) -> OrderingResult<u32> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ValidationError::FieldError {
            field: "quantity".to_string(),
            message: format!("quantity must be between 1 and {}", MAX_QUANTITY),
        }
        .into());
    }
    u32::try_from(quantity).map_err(|e| {
        ValidationError::FieldError {
            field: "quantity".to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Owner of every client's draft order
pub struct DraftService {
    store: Arc<dyn OrderingStore>,
    catalog: Arc<dyn ProductCatalog>,
    images: Arc<dyn ImageStorage>,
}

impl DraftService {
    pub fn new(
        store: Arc<dyn OrderingStore>,
        catalog: Arc<dyn ProductCatalog>,
        images: Arc<dyn ImageStorage>,
    ) -> Self {
        Self {
            store,
            catalog,
            images,
        }
    }

    /// The client's draft, or an empty unsaved one
    ///
    /// Never persists anything; the draft gets an id on its first item.
    pub async fn get_or_create(&self, tenant_id: &Uuid, client_id: &Uuid) -> OrderingResult<DraftOrder> {
        let draft = self.store.get_draft(tenant_id, client_id).await?;
        Ok(draft.unwrap_or_else(|| DraftOrder::empty(*tenant_id, *client_id)))
    }

    /// Add a catalog product, merging into an existing line for it
    ///
    /// The resulting line quantity must be in stock. Otherwise the product
    /// is flagged for restock and the draft is left untouched.
    pub async fn add_listed_item(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        input: AddListedItem,
    ) -> OrderingResult<DraftOrder> {
        input.validate()?;
        let quantity = to_quantity(input.quantity)?;

        let product = self
            .catalog
            .product(tenant_id, &input.product_id)
            .await?
            .ok_or(StockError::ProductUnavailable {
                product_id: input.product_id,
            })?;

        let mut draft = self.get_or_create(tenant_id, client_id).await?;
        let existing = draft
            .listed_item_mut(&product.id)
            .map(|item| item.quantity)
            .unwrap_or(0);
        let requested = existing.saturating_add(quantity);

        self.ensure_in_stock(tenant_id, client_id, &product.id, requested, product.stock)
            .await?;

        match draft.listed_item_mut(&product.id) {
            Some(item) => item.quantity = requested,
            None => draft.items.push(DraftOrderItem::listed(
                product.id,
                product.name,
                quantity,
                product.price,
                product.image_path,
            )),
        }

        let draft = self.store.save_draft(draft).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            product_id = %input.product_id,
            quantity = requested,
            "Listed item added to draft"
        );
        Ok(draft)
    }

    /// Append a free-text line, storing its image first if one was uploaded
    pub async fn add_unlisted_item(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        input: AddUnlistedItem,
    ) -> OrderingResult<DraftOrder> {
        input.validate()?;
        let quantity = to_quantity(input.quantity)?;

        let mut draft = self.get_or_create(tenant_id, client_id).await?;

        let image_path = match input.image {
            Some(image) => Some(
                self.images
                    .store(image.bytes, &image.filename, image.content_type.as_deref())
                    .await?,
            ),
            None => None,
        };

        draft.items.push(DraftOrderItem::unlisted(
            input.description.trim(),
            quantity,
            image_path.clone(),
        ));

        match self.store.save_draft(draft).await {
            Ok(draft) => {
                tracing::debug!(
                    tenant_id = %tenant_id,
                    client_id = %client_id,
                    quantity = quantity,
                    has_image = image_path.is_some(),
                    "Unlisted item added to draft"
                );
                Ok(draft)
            }
            Err(e) => {
                if let Some(path) = image_path {
                    self.delete_image_best_effort(client_id, &path).await;
                }
                Err(e.into())
            }
        }
    }

    /// Set (not increment) an item's quantity; below 1 removes the item
    pub async fn update_item_quantity(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        item_id: &Uuid,
        input: UpdateItemQuantity,
    ) -> OrderingResult<DraftOrder> {
        if input.quantity < 1 {
            return self.remove_item(tenant_id, client_id, item_id).await;
        }
        let quantity = to_quantity(input.quantity)?;

        let mut draft = self.get_or_create(tenant_id, client_id).await?;
        let item = draft
            .item(item_id)
            .ok_or(DraftError::ItemNotFound { item_id: *item_id })?;

        if let ItemSource::Listed { product_id, .. } = &item.source
            && quantity > item.quantity
        {
            let product_id = *product_id;
            let product = self
                .catalog
                .product(tenant_id, &product_id)
                .await?
                .ok_or(StockError::ProductUnavailable { product_id })?;
            self.ensure_in_stock(tenant_id, client_id, &product_id, quantity, product.stock)
                .await?;
        }

        if let Some(item) = draft.item_mut(item_id) {
            item.quantity = quantity;
        }

        let draft = self.store.save_draft(draft).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            item_id = %item_id,
            quantity = quantity,
            "Draft item quantity set"
        );
        Ok(draft)
    }

    /// Remove an item: best-effort image delete, then the item itself
    ///
    /// A failed image delete is logged and never fails the removal.
    pub async fn remove_item(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        item_id: &Uuid,
    ) -> OrderingResult<DraftOrder> {
        let mut draft = self.get_or_create(tenant_id, client_id).await?;
        let item = draft
            .item(item_id)
            .ok_or(DraftError::ItemNotFound { item_id: *item_id })?;

        if let Some(path) = owned_image(item) {
            let path = path.to_string();
            self.delete_image_best_effort(client_id, &path).await;
        }

        draft.remove_item(item_id);
        let draft = self.store.save_draft(draft).await?;

        tracing::debug!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            item_id = %item_id,
            "Draft item removed"
        );
        Ok(draft)
    }

    /// Detach and delete an unlisted item's image
    ///
    /// Succeeds whenever the item exists, whatever the storage says.
    pub async fn delete_item_image(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        item_id: &Uuid,
    ) -> OrderingResult<DraftOrder> {
        let mut draft = self.get_or_create(tenant_id, client_id).await?;
        let item = draft
            .item(item_id)
            .ok_or(DraftError::ItemNotFound { item_id: *item_id })?;

        let Some(path) = owned_image(item).map(str::to_string) else {
            return Ok(draft);
        };

        self.delete_image_best_effort(client_id, &path).await;
        if let Some(item) = draft.item_mut(item_id) {
            item.image_path = None;
        }

        Ok(self.store.save_draft(draft).await?)
    }

    async fn ensure_in_stock(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        product_id: &Uuid,
        requested: u32,
        available: u32,
    ) -> OrderingResult<()> {
        if requested <= available {
            return Ok(());
        }

        tracing::warn!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            product_id = %product_id,
            requested = requested,
            available = available,
            "Insufficient stock, flagging product for restock"
        );
        if let Err(e) = self
            .catalog
            .flag_for_restock(tenant_id, product_id, requested)
            .await
        {
            tracing::warn!(product_id = %product_id, error = %e, "Failed to flag product for restock");
        }

        Err(StockError::Insufficient {
            product_id: *product_id,
            requested,
            available,
        }
        .into())
    }

    async fn delete_image_best_effort(&self, client_id: &Uuid, path: &str) {
        if let Err(e) = self.images.delete(path).await {
            tracing::warn!(
                client_id = %client_id,
                path = %path,
                error = %e,
                "Failed to delete item image, continuing"
            );
        }
    }
}

/// Images uploaded with unlisted items belong to the draft; listed items
/// only reference the catalog's product image.
fn owned_image(item: &DraftOrderItem) -> Option<&str> {
    match item.source {
        ItemSource::Unlisted { .. } => item.image_path.as_deref(),
        ItemSource::Listed { .. } => None,
    }
}
