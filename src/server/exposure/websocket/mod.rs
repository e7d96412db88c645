//! WebSocket push channel
//!
//! ```text
//! Session ──ws──▶ /ws ──▶ ws_handler() ──▶ ConnectionManager
//!                                              │
//!                                   audience + kind filter
//!                                              │
//!                        EventBus ──broadcast──▶ dispatch ──▶ Session
//! ```
//!
//! Delivery is best-effort. A session that misses a push reconciles by
//! fetching `GET /order-control`; submission never depends on a push.

mod handler;
mod manager;
pub mod protocol;

pub use manager::ConnectionManager;

use crate::server::host::ServerHost;
use anyhow::Result;
use axum::{Router, routing::get};
use std::sync::Arc;

pub struct WebSocketExposure;

impl WebSocketExposure {
    /// Build the `/ws` router and spawn the dispatch loop on the host's bus
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let connection_manager = Arc::new(ConnectionManager::new());

        let cm = connection_manager.clone();
        let rx = host.event_bus().subscribe();
        tokio::spawn(async move {
            cm.run_dispatch_loop(rx).await;
        });

        let router = Router::new()
            .route("/ws", get(handler::ws_handler))
            .with_state(connection_manager);

        Ok(router)
    }
}
