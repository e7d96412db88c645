//! Submission gate: the only way a draft becomes an [`Order`]
//!
//! ```text
//! submit(client)
//!   1. evaluate live policy ──closed──▶ WindowClosed {advisory}   (nothing touched)
//!   2. load draft ───────────empty───▶ EmptyOrder                  (nothing touched)
//!   3. re-check stock ───────short───▶ StockError + restock flag   (draft untouched)
//!   4. commit_submission(draft@version)   freeze + clear, atomically
//!   5. publish order_submitted            after the commit, fire-and-forget
//! ```
//!
//! Every decision is re-derived from server-held state at the moment of
//! the call; nothing a client cached is trusted.

use crate::control::ControlService;
use crate::core::clock::Clock;
use crate::core::draft::DraftOrder;
use crate::core::error::{DraftError, OrderingResult, StockError, SubmissionError};
use crate::core::events::{EventBus, StorefrontEvent};
use crate::core::order::Order;
use crate::core::service::{OrderingStore, ProductCatalog};
use std::sync::Arc;
use uuid::Uuid;

pub struct SubmissionGate {
    store: Arc<dyn OrderingStore>,
    catalog: Arc<dyn ProductCatalog>,
    control: Arc<ControlService>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
}

impl SubmissionGate {
    pub fn new(
        store: Arc<dyn OrderingStore>,
        catalog: Arc<dyn ProductCatalog>,
        control: Arc<ControlService>,
        event_bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            control,
            event_bus,
            clock,
        }
    }

    /// Turn the client's draft into an order
    pub async fn submit(&self, tenant_id: &Uuid, client_id: &Uuid) -> OrderingResult<Order> {
        let (_, evaluation) = self.control.evaluate(tenant_id).await?;
        if !evaluation.open {
            let advisory = evaluation.advisory_message().map(str::to_string);
            tracing::info!(
                tenant_id = %tenant_id,
                client_id = %client_id,
                advisory = advisory.as_deref().unwrap_or(""),
                "Submission rejected, ordering window closed"
            );
            return Err(SubmissionError::WindowClosed { advisory }.into());
        }

        let draft = match self.store.get_draft(tenant_id, client_id).await? {
            Some(draft) if !draft.is_empty() => draft,
            _ => return Err(SubmissionError::EmptyOrder.into()),
        };

        self.recheck_stock(&draft).await?;

        let order = self.store.commit_submission(&draft, self.clock.now()).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            client_id = %client_id,
            order_id = %order.id,
            order_number = %order.order_number,
            items = order.item_count(),
            "Order submitted"
        );
        self.event_bus.publish(
            *tenant_id,
            StorefrontEvent::OrderSubmitted {
                order_id: order.id,
                order_number: order.order_number.clone(),
                client_id: *client_id,
                item_count: order.item_count(),
            },
        );

        Ok(order)
    }

    /// Orders submitted by a client
    pub async fn orders(&self, tenant_id: &Uuid, client_id: &Uuid) -> OrderingResult<Vec<Order>> {
        Ok(self.store.list_orders(tenant_id, client_id).await?)
    }

    /// One of the client's orders; other clients' orders are not found
    pub async fn order(
        &self,
        tenant_id: &Uuid,
        client_id: &Uuid,
        order_id: &Uuid,
    ) -> OrderingResult<Order> {
        self.store
            .get_order(tenant_id, order_id)
            .await?
            .filter(|order| &order.client_id == client_id)
            .ok_or_else(|| {
                DraftError::OrderNotFound {
                    order_id: *order_id,
                }
                .into()
            })
    }

    async fn recheck_stock(&self, draft: &DraftOrder) -> OrderingResult<()> {
        for item in &draft.items {
            let Some(product_id) = item.product_id() else {
                continue;
            };

            let product = self
                .catalog
                .product(&draft.tenant_id, &product_id)
                .await?
                .ok_or(StockError::ProductUnavailable { product_id })?;

            if item.quantity > product.stock {
                tracing::warn!(
                    tenant_id = %draft.tenant_id,
                    client_id = %draft.client_id,
                    product_id = %product_id,
                    requested = item.quantity,
                    available = product.stock,
                    "Stock changed since item was added, submission rejected"
                );
                if let Err(e) = self
                    .catalog
                    .flag_for_restock(&draft.tenant_id, &product_id, item.quantity)
                    .await
                {
                    tracing::warn!(product_id = %product_id, error = %e, "Failed to flag product for restock");
                }
                return Err(StockError::Insufficient {
                    product_id,
                    requested: item.quantity,
                    available: product.stock,
                }
                .into());
            }
        }
        Ok(())
    }
}
