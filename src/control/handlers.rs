//! HTTP handlers for order control
//!
//! Admin routes mutate the tenant's state; the client route only reads it.

use axum::{Json, extract::State};

use crate::control::service::{ControlSnapshot, SetCustomMessage};
use crate::core::control::{OrderControlPatch, OrderControlState};
use crate::core::error::OrderingResult;
use crate::core::extractors::{AdminSession, ClientSession};
use crate::server::router::AppState;

/// GET /order-control
pub async fn get_client_control(
    State(state): State<AppState>,
    session: ClientSession,
) -> OrderingResult<Json<ControlSnapshot>> {
    Ok(Json(state.control.client_snapshot(&session.tenant_id).await?))
}

/// GET /admin/order-control
pub async fn get_admin_control(
    State(state): State<AppState>,
    session: AdminSession,
) -> OrderingResult<Json<OrderControlState>> {
    Ok(Json(state.control.snapshot(&session.tenant_id).await?))
}

/// PATCH /admin/order-control
pub async fn patch_control(
    State(state): State<AppState>,
    session: AdminSession,
    Json(patch): Json<OrderControlPatch>,
) -> OrderingResult<Json<OrderControlState>> {
    tracing::debug!(admin_id = %session.admin_id, tenant_id = %session.tenant_id, "Admin control patch");
    Ok(Json(state.control.patch(&session.tenant_id, patch).await?))
}

/// PUT /admin/order-control/message
pub async fn set_message(
    State(state): State<AppState>,
    session: AdminSession,
    Json(payload): Json<SetCustomMessage>,
) -> OrderingResult<Json<OrderControlState>> {
    Ok(Json(
        state
            .control
            .set_custom_message(&session.tenant_id, payload)
            .await?,
    ))
}

/// DELETE /admin/order-control/message
pub async fn clear_message(
    State(state): State<AppState>,
    session: AdminSession,
) -> OrderingResult<Json<OrderControlState>> {
    Ok(Json(state.control.clear_custom_message(&session.tenant_id).await?))
}

/// POST /admin/order-control/reset
pub async fn reset_control(
    State(state): State<AppState>,
    session: AdminSession,
) -> OrderingResult<Json<OrderControlState>> {
    tracing::info!(admin_id = %session.admin_id, tenant_id = %session.tenant_id, "Admin reset order control");
    Ok(Json(state.control.reset(&session.tenant_id).await?))
}
