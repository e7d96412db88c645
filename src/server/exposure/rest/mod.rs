//! REST exposure
//!
//! Consumes a `ServerHost` and produces the axum `Router` for the client
//! and admin HTTP surfaces.

use super::super::host::ServerHost;
use crate::server::router::{AppState, build_admin_routes, build_client_routes};
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Health routes, then custom routes, then the client and admin routes.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let state = AppState::from_host(&host);

        let mut app = Self::health_routes();

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app = app
            .merge(build_client_routes(state.clone()))
            .merge(build_admin_routes(state));

        Ok(app)
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "wholesale-ordering"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerBuilder;
    use crate::storage::InMemoryCatalog;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn host() -> Arc<ServerHost> {
        Arc::new(
            ServerBuilder::new()
                .with_catalog(InMemoryCatalog::new())
                .build_host()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = RestExposure::build_router(host(), vec![]).unwrap();

        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["service"], "wholesale-ordering");
    }

    #[tokio::test]
    async fn test_client_routes_require_identity() {
        let app = RestExposure::build_router(host(), vec![]).unwrap();

        let response = app
            .oneshot(Request::get("/draft").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_custom_routes_are_merged() {
        let custom = Router::new().route("/ping", get(|| async { "pong" }));
        let app = RestExposure::build_router(host(), vec![custom]).unwrap();

        let response = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
