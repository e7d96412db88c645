//! Route table for the storefront API

use crate::control::ControlService;
use crate::control::handlers::{
    clear_message, get_admin_control, get_client_control, patch_control, reset_control,
    set_message,
};
use crate::drafts::DraftService;
use crate::drafts::handlers::{
    add_listed_item, add_unlisted_item, delete_item_image, get_draft, remove_item, update_item,
};
use crate::server::host::ServerHost;
use crate::submission::SubmissionGate;
use crate::submission::handlers::{get_order, list_orders, submit_draft};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub drafts: Arc<DraftService>,
    pub control: Arc<ControlService>,
    pub gate: Arc<SubmissionGate>,
}

impl AppState {
    pub fn from_host(host: &ServerHost) -> Self {
        Self {
            drafts: host.drafts.clone(),
            control: host.control.clone(),
            gate: host.gate.clone(),
        }
    }
}

/// Client routes, scoped by the `x-tenant-id` / `x-client-id` headers
///
/// - GET    /draft
/// - POST   /draft/items
/// - POST   /draft/items/unlisted
/// - PUT    /draft/items/{item_id}
/// - DELETE /draft/items/{item_id}
/// - DELETE /draft/items/{item_id}/image
/// - POST   /draft/submit
/// - GET    /orders
/// - GET    /orders/{order_id}
/// - GET    /order-control
pub fn build_client_routes(state: AppState) -> Router {
    Router::new()
        .route("/draft", get(get_draft))
        .route("/draft/items", post(add_listed_item))
        .route("/draft/items/unlisted", post(add_unlisted_item))
        .route("/draft/items/{item_id}", put(update_item).delete(remove_item))
        .route("/draft/items/{item_id}/image", delete(delete_item_image))
        .route("/draft/submit", post(submit_draft))
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}", get(get_order))
        .route("/order-control", get(get_client_control))
        .with_state(state)
}

/// Admin routes, scoped by the `x-tenant-id` / `x-admin-id` headers
///
/// - GET    /admin/order-control
/// - PATCH  /admin/order-control
/// - PUT    /admin/order-control/message
/// - DELETE /admin/order-control/message
/// - POST   /admin/order-control/reset
pub fn build_admin_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/order-control",
            get(get_admin_control).patch(patch_control),
        )
        .route(
            "/admin/order-control/message",
            put(set_message).delete(clear_message),
        )
        .route("/admin/order-control/reset", post(reset_control))
        .with_state(state)
}
