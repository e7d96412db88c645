//! ServerBuilder for fluent storefront server construction

use super::exposure::RestExposure;
#[cfg(feature = "websocket")]
use super::exposure::WebSocketExposure;
use super::host::{HostComponents, ServerHost};
use crate::config::StorefrontConfig;
use crate::core::auth::{ADMIN_HEADER, CLIENT_HEADER, TENANT_HEADER};
use crate::core::clock::{Clock, SystemClock};
use crate::core::events::EventBus;
use crate::core::service::{ControlStore, ImageStorage, OrderingStore, ProductCatalog};
use crate::storage::InMemoryImageStorage;
#[cfg(feature = "in-memory")]
use crate::storage::{InMemoryControlStore, InMemoryOrderingStore};
use anyhow::Result;
use axum::Router;
use axum::http::{HeaderName, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the storefront HTTP + WebSocket server
///
/// # Example
///
/// ```rust,ignore
/// let catalog = InMemoryCatalog::new();
///
/// ServerBuilder::new()
///     .with_config(StorefrontConfig::from_yaml_file("storefront.yaml")?)
///     .with_catalog(catalog)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: StorefrontConfig,
    ordering_store: Option<Arc<dyn OrderingStore>>,
    control_store: Option<Arc<dyn ControlStore>>,
    catalog: Option<Arc<dyn ProductCatalog>>,
    images: Option<Arc<dyn ImageStorage>>,
    clock: Option<Arc<dyn Clock>>,
    custom_routes: Vec<Router>,
    event_bus: Option<EventBus>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: StorefrontConfig::default(),
            ordering_store: None,
            control_store: None,
            catalog: None,
            images: None,
            clock: None,
            custom_routes: Vec::new(),
            event_bus: None,
        }
    }

    pub fn with_config(mut self, config: StorefrontConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ordering_store(mut self, store: impl OrderingStore + 'static) -> Self {
        self.ordering_store = Some(Arc::new(store));
        self
    }

    pub fn with_control_store(mut self, store: impl ControlStore + 'static) -> Self {
        self.control_store = Some(Arc::new(store));
        self
    }

    pub fn with_catalog(mut self, catalog: impl ProductCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn with_image_storage(mut self, images: impl ImageStorage + 'static) -> Self {
        self.images = Some(Arc::new(images));
        self
    }

    /// Use a shared clock, e.g. a `FixedClock` a test keeps driving
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add custom routes
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Use an event bus with `capacity` instead of `server.event_bus_capacity`
    pub fn with_event_bus(mut self, capacity: usize) -> Self {
        self.event_bus = Some(EventBus::new(capacity));
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Without explicit stores the in-memory ones are used. A product
    /// catalog is always required.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let catalog = self.catalog.take().ok_or_else(|| {
            anyhow::anyhow!("ProductCatalog is required. Call .with_catalog()")
        })?;
        let ordering_store = self.take_ordering_store()?;
        let control_store = self.take_control_store()?;

        let components = HostComponents {
            ordering_store,
            control_store,
            catalog,
            images: self
                .images
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryImageStorage::new())),
            clock: self.clock.take().unwrap_or_else(|| Arc::new(SystemClock)),
            event_bus: self
                .event_bus
                .take()
                .unwrap_or_else(|| EventBus::new(self.config.server.event_bus_capacity)),
        };

        ServerHost::from_builder_components(self.config, components)
    }

    /// Build the complete router (REST and, with the feature, WebSocket)
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Self::router_for(host, custom_routes)
    }

    /// Router for an existing host, with tracing and CORS layers
    pub fn router_for(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        #[allow(unused_mut)]
        let mut app = RestExposure::build_router(host.clone(), custom_routes)?;

        #[cfg(feature = "websocket")]
        {
            app = app.merge(WebSocketExposure::build_router(host)?);
        }

        Ok(app.layer(TraceLayer::new_for_http()).layer(cors()))
    }

    /// Serve with graceful shutdown and the expiry sweeper running
    pub async fn serve(mut self, addr: &str) -> Result<()> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let sweeper = host.spawn_expiry_sweeper();
        let app = Self::router_for(host, custom_routes)?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    #[cfg(feature = "in-memory")]
    fn take_ordering_store(&mut self) -> Result<Arc<dyn OrderingStore>> {
        Ok(self.ordering_store.take().unwrap_or_else(|| {
            Arc::new(InMemoryOrderingStore::with_prefix(
                self.config.ordering.order_number_prefix.clone(),
            ))
        }))
    }

    #[cfg(not(feature = "in-memory"))]
    fn take_ordering_store(&mut self) -> Result<Arc<dyn OrderingStore>> {
        self.ordering_store.take().ok_or_else(|| {
            anyhow::anyhow!("OrderingStore is required. Call .with_ordering_store()")
        })
    }

    #[cfg(feature = "in-memory")]
    fn take_control_store(&mut self) -> Result<Arc<dyn ControlStore>> {
        Ok(self
            .control_store
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryControlStore::new())))
    }

    #[cfg(not(feature = "in-memory"))]
    fn take_control_store(&mut self) -> Result<Arc<dyn ControlStore>> {
        self.control_store.take().ok_or_else(|| {
            anyhow::anyhow!("ControlStore is required. Call .with_control_store()")
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(TENANT_HEADER),
            HeaderName::from_static(CLIENT_HEADER),
            HeaderName::from_static(ADMIN_HEADER),
        ])
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
