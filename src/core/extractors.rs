//! Axum extractors for request identity
//!
//! Handlers take a [`ClientSession`] or [`AdminSession`] argument instead of
//! reading headers themselves. A missing or malformed identity header
//! rejects the request before the handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::core::auth::AuthContext;
use crate::core::error::OrderingError;

/// Identity of a wholesale client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSession {
    pub tenant_id: Uuid,
    pub client_id: Uuid,
}

impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = OrderingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match AuthContext::client_from_headers(&parts.headers)? {
            AuthContext::Client {
                tenant_id,
                client_id,
            } => Ok(Self {
                tenant_id,
                client_id,
            }),
            AuthContext::Admin { .. } => Err(OrderingError::Internal(
                "client extraction produced an admin context".to_string(),
            )),
        }
    }
}

/// Identity of a tenant administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession {
    pub tenant_id: Uuid,
    pub admin_id: Uuid,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = OrderingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match AuthContext::admin_from_headers(&parts.headers)? {
            AuthContext::Admin {
                tenant_id,
                admin_id,
            } => Ok(Self {
                tenant_id,
                admin_id,
            }),
            AuthContext::Client { .. } => Err(OrderingError::Internal(
                "admin extraction produced a client context".to_string(),
            )),
        }
    }
}
