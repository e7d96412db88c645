//! Service traits for persistence and external collaborators
//!
//! The engine is agnostic to where drafts, orders, control state, products
//! and images actually live. Every seam is an `async_trait` returning
//! `anyhow::Result`; typed failures (e.g. [`StorageError::Conflict`]) are
//! wrapped in the `anyhow::Error` and recovered by `OrderingError`.
//!
//! [`StorageError::Conflict`]: crate::core::error::StorageError::Conflict

use crate::core::control::OrderControlState;
use crate::core::draft::DraftOrder;
use crate::core::order::Order;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistence for drafts and submitted orders
#[async_trait]
pub trait OrderingStore: Send + Sync {
    /// The client's draft, if one was ever persisted
    async fn get_draft(&self, tenant_id: &Uuid, client_id: &Uuid) -> Result<Option<DraftOrder>>;

    /// Upsert the client's single draft
    ///
    /// Assigns an id on first save, bumps `version` and sets `updated_at`.
    /// Concurrent saves are last-write-wins, except that a draft read before
    /// a submission cleared it fails with `StorageError::Conflict`.
    async fn save_draft(&self, draft: DraftOrder) -> Result<DraftOrder>;

    /// Freeze `draft` into an [`Order`] and clear the stored draft, atomically
    ///
    /// Fails with `StorageError::Conflict` (and writes nothing) when the
    /// stored draft's version differs from `draft.version`.
    async fn commit_submission(&self, draft: &DraftOrder, created_at: DateTime<Utc>)
    -> Result<Order>;

    /// Orders of one client, oldest first
    async fn list_orders(&self, tenant_id: &Uuid, client_id: &Uuid) -> Result<Vec<Order>>;

    /// Get an order by ID
    async fn get_order(&self, tenant_id: &Uuid, order_id: &Uuid) -> Result<Option<Order>>;
}

/// Persistence for per-tenant order control state
#[async_trait]
pub trait ControlStore: Send + Sync {
    async fn get(&self, tenant_id: &Uuid) -> Result<Option<OrderControlState>>;

    async fn put(&self, tenant_id: &Uuid, state: OrderControlState) -> Result<()>;

    /// Tenants that have a stored state
    async fn tenants(&self) -> Result<Vec<Uuid>>;
}

/// Current view of a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Product catalog owned by another part of the storefront
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Product by ID; `None` when unknown or no longer sold
    async fn product(&self, tenant_id: &Uuid, product_id: &Uuid)
    -> Result<Option<ProductSnapshot>>;

    /// Record that a client asked for more than is in stock
    async fn flag_for_restock(&self, tenant_id: &Uuid, product_id: &Uuid, requested: u32)
    -> Result<()>;
}

/// External image storage for unlisted item pictures
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store an image, returning the path to reference it by
    async fn store(&self, bytes: Vec<u8>, filename: &str, content_type: Option<&str>)
    -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;
}
