//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` owns the wired-up services and collaborators. Exposures
//! (REST, WebSocket) consume an `Arc<ServerHost>` and only translate
//! between their protocol and the services.

use crate::config::StorefrontConfig;
use crate::control::ControlService;
use crate::core::clock::Clock;
use crate::core::events::EventBus;
use crate::core::service::{ControlStore, ImageStorage, OrderingStore, ProductCatalog};
use crate::drafts::DraftService;
use crate::submission::SubmissionGate;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Collaborators the host is built from
pub struct HostComponents {
    pub ordering_store: Arc<dyn OrderingStore>,
    pub control_store: Arc<dyn ControlStore>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub images: Arc<dyn ImageStorage>,
    pub clock: Arc<dyn Clock>,
    pub event_bus: EventBus,
}

/// Host context containing all storefront state
pub struct ServerHost {
    pub config: Arc<StorefrontConfig>,

    pub drafts: Arc<DraftService>,
    pub control: Arc<ControlService>,
    pub gate: Arc<SubmissionGate>,

    /// Push channel for control changes and submissions
    pub event_bus: Arc<EventBus>,

    pub clock: Arc<dyn Clock>,
}

impl ServerHost {
    /// Wire services from validated configuration and collaborators
    pub fn from_builder_components(
        config: StorefrontConfig,
        components: HostComponents,
    ) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let event_bus = Arc::new(components.event_bus);

        let control = Arc::new(ControlService::new(
            components.control_store,
            event_bus.clone(),
            components.clock.clone(),
            config.defaults.clone(),
            config.evaluator(),
            config.ordering.clone(),
        ));

        let drafts = Arc::new(DraftService::new(
            components.ordering_store.clone(),
            components.catalog.clone(),
            components.images,
        ));

        let gate = Arc::new(SubmissionGate::new(
            components.ordering_store,
            components.catalog,
            control.clone(),
            event_bus.clone(),
            components.clock.clone(),
        ));

        Ok(Self {
            config,
            drafts,
            control,
            gate,
            event_bus,
            clock: components.clock,
        })
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Start the background sweep clearing expired custom messages
    pub fn spawn_expiry_sweeper(&self) -> JoinHandle<()> {
        let interval = Duration::from_secs(self.config.server.expiry_sweep_interval_secs);
        self.control.clone().spawn_expiry_sweeper(interval)
    }
}
