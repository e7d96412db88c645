//! Request identity for the storefront
//!
//! Authentication mechanics live outside this crate. An upstream gateway
//! authenticates the caller and forwards trusted identity headers:
//!
//! - `x-tenant-id`: the storefront (admin scope) the request belongs to
//! - `x-client-id`: the wholesale client, on client routes
//! - `x-admin-id`: the administrator, on admin routes
//!
//! A client id is only ever read from these headers, never from a path or
//! body, so a client can only address its own draft.

use crate::core::error::RequestError;
use axum::http::HeaderMap;
use uuid::Uuid;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const CLIENT_HEADER: &str = "x-client-id";
pub const ADMIN_HEADER: &str = "x-admin-id";

/// Identity extracted from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// Wholesale client of a tenant
    Client { tenant_id: Uuid, client_id: Uuid },

    /// Administrator of a tenant
    Admin { tenant_id: Uuid, admin_id: Uuid },
}

impl AuthContext {
    pub fn tenant_id(&self) -> Uuid {
        match self {
            AuthContext::Client { tenant_id, .. } | AuthContext::Admin { tenant_id, .. } => {
                *tenant_id
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    pub fn client_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::Client { client_id, .. } => Some(*client_id),
            AuthContext::Admin { .. } => None,
        }
    }

    /// Client identity from `x-tenant-id` + `x-client-id`
    pub fn client_from_headers(headers: &HeaderMap) -> Result<Self, RequestError> {
        Ok(AuthContext::Client {
            tenant_id: uuid_header(headers, TENANT_HEADER)?,
            client_id: uuid_header(headers, CLIENT_HEADER)?,
        })
    }

    /// Admin identity from `x-tenant-id` + `x-admin-id`
    pub fn admin_from_headers(headers: &HeaderMap) -> Result<Self, RequestError> {
        Ok(AuthContext::Admin {
            tenant_id: uuid_header(headers, TENANT_HEADER)?,
            admin_id: uuid_header(headers, ADMIN_HEADER)?,
        })
    }
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Uuid, RequestError> {
    let value = headers
        .get(name)
        .ok_or_else(|| RequestError::MissingHeader {
            header: name.to_string(),
        })?;

    let value = value.to_str().map_err(|e| RequestError::InvalidHeader {
        header: name.to_string(),
        message: e.to_string(),
    })?;

    Uuid::parse_str(value.trim()).map_err(|e| RequestError::InvalidHeader {
        header: name.to_string(),
        message: e.to_string(),
    })
}
