//! HTTP handlers for submission and submitted orders

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::core::error::OrderingResult;
use crate::core::extractors::ClientSession;
use crate::core::order::Order;
use crate::server::router::AppState;

/// POST /draft/submit
pub async fn submit_draft(
    State(state): State<AppState>,
    session: ClientSession,
) -> OrderingResult<(StatusCode, Json<Order>)> {
    let order = state
        .gate
        .submit(&session.tenant_id, &session.client_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    session: ClientSession,
) -> OrderingResult<Json<Vec<Order>>> {
    Ok(Json(
        state
            .gate
            .orders(&session.tenant_id, &session.client_id)
            .await?,
    ))
}

/// GET /orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    session: ClientSession,
    Path(order_id): Path<Uuid>,
) -> OrderingResult<Json<Order>> {
    Ok(Json(
        state
            .gate
            .order(&session.tenant_id, &session.client_id, &order_id)
            .await?,
    ))
}
