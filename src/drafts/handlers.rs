//! HTTP handlers for the client's draft order
//!
//! The client id always comes from [`ClientSession`]; a client can never
//! name another client's draft.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::core::draft::{DraftOrder, DraftSummary};
use crate::core::error::{OrderingResult, RequestError, ValidationError};
use crate::core::extractors::ClientSession;
use crate::drafts::service::{AddListedItem, AddUnlistedItem, ImageUpload, UpdateItemQuantity};
use crate::server::router::AppState;

async fn summarize(
    state: &AppState,
    session: &ClientSession,
    draft: DraftOrder,
) -> OrderingResult<Json<DraftSummary>> {
    let control = state.control.snapshot(&session.tenant_id).await?;
    Ok(Json(draft.summary(control.show_sale_price)))
}

/// GET /draft
pub async fn get_draft(
    State(state): State<AppState>,
    session: ClientSession,
) -> OrderingResult<Json<DraftSummary>> {
    let draft = state
        .drafts
        .get_or_create(&session.tenant_id, &session.client_id)
        .await?;
    summarize(&state, &session, draft).await
}

/// POST /draft/items
pub async fn add_listed_item(
    State(state): State<AppState>,
    session: ClientSession,
    Json(payload): Json<AddListedItem>,
) -> OrderingResult<Json<DraftSummary>> {
    let draft = state
        .drafts
        .add_listed_item(&session.tenant_id, &session.client_id, payload)
        .await?;
    summarize(&state, &session, draft).await
}

/// POST /draft/items/unlisted (multipart: description, quantity, image?)
pub async fn add_unlisted_item(
    State(state): State<AppState>,
    session: ClientSession,
    multipart: Multipart,
) -> OrderingResult<Json<DraftSummary>> {
    let input = read_unlisted_form(multipart).await?;
    let draft = state
        .drafts
        .add_unlisted_item(&session.tenant_id, &session.client_id, input)
        .await?;
    summarize(&state, &session, draft).await
}

/// PUT /draft/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    session: ClientSession,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemQuantity>,
) -> OrderingResult<Json<DraftSummary>> {
    let draft = state
        .drafts
        .update_item_quantity(&session.tenant_id, &session.client_id, &item_id, payload)
        .await?;
    summarize(&state, &session, draft).await
}

/// DELETE /draft/items/{item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    session: ClientSession,
    Path(item_id): Path<Uuid>,
) -> OrderingResult<Json<DraftSummary>> {
    let draft = state
        .drafts
        .remove_item(&session.tenant_id, &session.client_id, &item_id)
        .await?;
    summarize(&state, &session, draft).await
}

/// DELETE /draft/items/{item_id}/image
pub async fn delete_item_image(
    State(state): State<AppState>,
    session: ClientSession,
    Path(item_id): Path<Uuid>,
) -> OrderingResult<StatusCode> {
    state
        .drafts
        .delete_item_image(&session.tenant_id, &session.client_id, &item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_unlisted_form(mut multipart: Multipart) -> OrderingResult<AddUnlistedItem> {
    let mut description = String::new();
    let mut quantity: Option<i64> = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("description") => {
                description = field.text().await.map_err(invalid_body)?;
            }
            Some("quantity") => {
                let raw = field.text().await.map_err(invalid_body)?;
                let parsed = raw.trim().parse::<i64>().map_err(|_| ValidationError::FieldError {
                    field: "quantity".to_string(),
                    message: format!("'{}' is not a number", raw.trim()),
                })?;
                quantity = Some(parsed);
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_body)?;
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let quantity = quantity.ok_or_else(|| ValidationError::MissingArgument {
        argument: "quantity".to_string(),
    })?;

    Ok(AddUnlistedItem {
        description,
        quantity,
        image,
    })
}

fn invalid_body(e: axum::extract::multipart::MultipartError) -> RequestError {
    RequestError::InvalidBody {
        message: e.to_string(),
    }
}
