//! In-memory stores for testing, demos and single-node deployments

use crate::core::control::OrderControlState;
use crate::core::draft::{DraftOrder, DraftStatus};
use crate::core::error::StorageError;
use crate::core::order::{Order, OrderStatus};
use crate::core::service::{ControlStore, OrderingStore, ProductCatalog, ProductSnapshot};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct OrderingTables {
    /// One draft per (tenant, client)
    drafts: HashMap<(Uuid, Uuid), DraftOrder>,
    orders: Vec<Order>,
    sequence: u64,
}

/// In-memory drafts and orders
///
/// Drafts and orders share one lock, so a submission commit is observed
/// either fully applied or not at all.
#[derive(Clone)]
pub struct InMemoryOrderingStore {
    tables: Arc<RwLock<OrderingTables>>,
    order_number_prefix: String,
}

impl InMemoryOrderingStore {
    pub fn new() -> Self {
        Self::with_prefix("WO")
    }

    /// Store whose order numbers read `{prefix}-000001`, `{prefix}-000002`, ...
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(OrderingTables::default())),
            order_number_prefix: prefix.into(),
        }
    }
}

impl Default for InMemoryOrderingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderingStore for InMemoryOrderingStore {
    async fn get_draft(&self, tenant_id: &Uuid, client_id: &Uuid) -> Result<Option<DraftOrder>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.drafts.get(&(*tenant_id, *client_id)).cloned())
    }

    async fn save_draft(&self, mut draft: DraftOrder) -> Result<DraftOrder> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let key = (draft.tenant_id, draft.client_id);
        let current = tables.drafts.get(&key);

        // A draft read before a submission carries the submitted draft's id
        if let Some(read_id) = draft.id
            && current.and_then(|stored| stored.id) != Some(read_id)
        {
            return Err(StorageError::Conflict {
                message: "draft was submitted since it was read".to_string(),
            }
            .into());
        }

        // Keep the stored identity; a client never holds two drafts
        draft.id = current
            .and_then(|stored| stored.id)
            .or(draft.id)
            .or_else(|| Some(Uuid::new_v4()));
        draft.version = current.map(|stored| stored.version).unwrap_or(0) + 1;
        draft.status = DraftStatus::Draft;
        draft.updated_at = Some(Utc::now());

        tables.drafts.insert(key, draft.clone());

        Ok(draft)
    }

    async fn commit_submission(
        &self,
        draft: &DraftOrder,
        created_at: DateTime<Utc>,
    ) -> Result<Order> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let key = (draft.tenant_id, draft.client_id);
        let stored = tables
            .drafts
            .get(&key)
            .ok_or_else(|| StorageError::Conflict {
                message: "draft no longer exists".to_string(),
            })?;

        if stored.version != draft.version {
            return Err(StorageError::Conflict {
                message: format!(
                    "draft changed since it was read (version {} != {})",
                    stored.version, draft.version
                ),
            }
            .into());
        }

        let items = stored.items.clone();
        let sequence = tables.sequence + 1;

        let order = Order {
            id: Uuid::new_v4(),
            order_number: format!("{}-{:06}", self.order_number_prefix, sequence),
            tenant_id: draft.tenant_id,
            client_id: draft.client_id,
            created_at,
            status: OrderStatus::Submitted,
            items,
        };

        // Nothing below can fail: freeze and clear land together
        tables.sequence = sequence;
        tables.orders.push(order.clone());
        if let Some(stored) = tables.drafts.get_mut(&key) {
            stored.id = None;
            stored.items.clear();
            stored.version += 1;
            stored.updated_at = Some(created_at);
        }

        Ok(order)
    }

    async fn list_orders(&self, tenant_id: &Uuid, client_id: &Uuid) -> Result<Vec<Order>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables
            .orders
            .iter()
            .filter(|order| &order.tenant_id == tenant_id && &order.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn get_order(&self, tenant_id: &Uuid, order_id: &Uuid) -> Result<Option<Order>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables
            .orders
            .iter()
            .find(|order| &order.tenant_id == tenant_id && &order.id == order_id)
            .cloned())
    }
}

/// In-memory per-tenant control state
#[derive(Clone, Default)]
pub struct InMemoryControlStore {
    states: Arc<RwLock<HashMap<Uuid, OrderControlState>>>,
}

impl InMemoryControlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlStore for InMemoryControlStore {
    async fn get(&self, tenant_id: &Uuid) -> Result<Option<OrderControlState>> {
        let states = self
            .states
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(states.get(tenant_id).cloned())
    }

    async fn put(&self, tenant_id: &Uuid, state: OrderControlState) -> Result<()> {
        let mut states = self
            .states
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        states.insert(*tenant_id, state);
        Ok(())
    }

    async fn tenants(&self) -> Result<Vec<Uuid>> {
        let states = self
            .states
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(states.keys().copied().collect())
    }
}

/// A product a client wanted more of than was in stock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockFlag {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub requested: u32,
    pub flagged_at: DateTime<Utc>,
}

/// In-memory product catalog
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<(Uuid, Uuid), ProductSnapshot>>>,
    restock_flags: Arc<RwLock<Vec<RestockFlag>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product of a tenant
    pub fn upsert(&self, tenant_id: Uuid, product: ProductSnapshot) -> Result<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        products.insert((tenant_id, product.id), product);
        Ok(())
    }

    pub fn set_stock(&self, tenant_id: Uuid, product_id: Uuid, stock: u32) -> Result<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let product = products
            .get_mut(&(tenant_id, product_id))
            .ok_or_else(|| anyhow!("Product not found"))?;
        product.stock = stock;
        Ok(())
    }

    pub fn remove(&self, tenant_id: Uuid, product_id: Uuid) -> Result<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        products.remove(&(tenant_id, product_id));
        Ok(())
    }

    pub fn restock_flags(&self) -> Result<Vec<RestockFlag>> {
        let flags = self
            .restock_flags
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(flags.clone())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn product(
        &self,
        tenant_id: &Uuid,
        product_id: &Uuid,
    ) -> Result<Option<ProductSnapshot>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(products.get(&(*tenant_id, *product_id)).cloned())
    }

    async fn flag_for_restock(
        &self,
        tenant_id: &Uuid,
        product_id: &Uuid,
        requested: u32,
    ) -> Result<()> {
        let mut flags = self
            .restock_flags
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        flags.push(RestockFlag {
            tenant_id: *tenant_id,
            product_id: *product_id,
            requested,
            flagged_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draft::DraftOrderItem;
    use crate::core::error::OrderingError;
    use rust_decimal::Decimal;

    fn draft_with_item(tenant_id: Uuid, client_id: Uuid) -> DraftOrder {
        let mut draft = DraftOrder::empty(tenant_id, client_id);
        draft.items.push(DraftOrderItem::listed(
            Uuid::new_v4(),
            "Flour 25kg",
            2,
            Decimal::new(1000, 2),
            None,
        ));
        draft
    }

    #[tokio::test]
    async fn test_save_draft_assigns_id_and_version() {
        let store = InMemoryOrderingStore::new();
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());

        let saved = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        assert!(saved.id.is_some());
        assert_eq!(saved.version, 1);

        let again = store.save_draft(saved.clone()).await.unwrap();
        assert_eq!(again.id, saved.id);
        assert_eq!(again.version, 2);
    }

    #[tokio::test]
    async fn test_one_draft_per_client() {
        let store = InMemoryOrderingStore::new();
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        // A second "fresh" draft for the same client replaces, never duplicates
        let second = store.save_draft(draft_with_item(tenant, client)).await.unwrap();

        assert_eq!(first.id, second.id);
        let stored = store.get_draft(&tenant, &client).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_commit_submission_freezes_and_clears() {
        let store = InMemoryOrderingStore::with_prefix("TST");
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());
        let saved = store.save_draft(draft_with_item(tenant, client)).await.unwrap();

        let order = store.commit_submission(&saved, Utc::now()).await.unwrap();
        assert_eq!(order.order_number, "TST-000001");
        assert_eq!(order.items, saved.items);

        let draft = store.get_draft(&tenant, &client).await.unwrap().unwrap();
        assert!(draft.is_empty());
        assert!(draft.id.is_none());
        assert_eq!(store.list_orders(&tenant, &client).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_submission_conflict_writes_nothing() {
        let store = InMemoryOrderingStore::new();
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());
        let stale = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        store.save_draft(stale.clone()).await.unwrap();

        let err = store.commit_submission(&stale, Utc::now()).await.unwrap_err();
        let err: OrderingError = err.into();
        assert_eq!(err.reason(), "conflict");

        assert!(store.list_orders(&tenant, &client).await.unwrap().is_empty());
        let draft = store.get_draft(&tenant, &client).await.unwrap().unwrap();
        assert_eq!(draft.items.len(), 1);
    }

    #[tokio::test]
    async fn test_save_after_submission_conflicts() {
        let store = InMemoryOrderingStore::new();
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());
        let read = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        store.commit_submission(&read, Utc::now()).await.unwrap();

        let err = store.save_draft(read).await.unwrap_err();
        let err: OrderingError = err.into();
        assert_eq!(err.reason(), "conflict");

        let draft = store.get_draft(&tenant, &client).await.unwrap().unwrap();
        assert!(draft.is_empty());

        // The next draft starts from the cleared one
        let fresh = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        assert!(fresh.id.is_some());
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential() {
        let store = InMemoryOrderingStore::new();
        let tenant = Uuid::new_v4();

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let client = Uuid::new_v4();
            let saved = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
            numbers.push(store.commit_submission(&saved, Utc::now()).await.unwrap().order_number);
        }

        assert_eq!(numbers, vec!["WO-000001", "WO-000002", "WO-000003"]);
    }

    #[tokio::test]
    async fn test_orders_are_tenant_scoped() {
        let store = InMemoryOrderingStore::new();
        let (tenant, client) = (Uuid::new_v4(), Uuid::new_v4());
        let saved = store.save_draft(draft_with_item(tenant, client)).await.unwrap();
        let order = store.commit_submission(&saved, Utc::now()).await.unwrap();

        assert!(store.get_order(&tenant, &order.id).await.unwrap().is_some());
        assert!(store.get_order(&Uuid::new_v4(), &order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_control_store_roundtrip() {
        let store = InMemoryControlStore::new();
        let tenant = Uuid::new_v4();
        assert!(store.get(&tenant).await.unwrap().is_none());

        let state = OrderControlState {
            show_quantity: false,
            ..OrderControlState::default()
        };
        store.put(&tenant, state.clone()).await.unwrap();

        assert_eq!(store.get(&tenant).await.unwrap(), Some(state));
        assert_eq!(store.tenants().await.unwrap(), vec![tenant]);
    }

    #[tokio::test]
    async fn test_catalog_restock_flags() {
        let catalog = InMemoryCatalog::new();
        let tenant = Uuid::new_v4();
        let product = ProductSnapshot {
            id: Uuid::new_v4(),
            name: "Sugar".to_string(),
            price: Decimal::new(300, 2),
            stock: 5,
            image_path: None,
        };
        catalog.upsert(tenant, product.clone()).unwrap();

        assert_eq!(catalog.product(&tenant, &product.id).await.unwrap(), Some(product.clone()));
        assert!(catalog.product(&Uuid::new_v4(), &product.id).await.unwrap().is_none());

        catalog.flag_for_restock(&tenant, &product.id, 9).await.unwrap();
        let flags = catalog.restock_flags().unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].requested, 9);
    }
}
