//! # Wholesale Ordering
//!
//! Order window control and draft order lifecycle engine for wholesale
//! storefronts.
//!
//! ## Features
//!
//! - **Order windows**: daily, weekly and monthly schedules evaluated in the
//!   tenant's wall-clock time, with threshold-driven advisories
//! - **Draft orders**: one authoritative in-progress order per client with
//!   stock-aware item operations and unlisted items with images
//! - **Submission gate**: window and stock re-checked at submit time, then a
//!   single atomic draft → order transition
//! - **Real-time control**: admin patches and custom messages pushed over
//!   WebSocket, merged client-side with per-field revisions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ordering::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let catalog = InMemoryCatalog::new();
//!
//!     ServerBuilder::new()
//!         .with_config(StorefrontConfig::from_yaml_file("storefront.yaml")?)
//!         .with_catalog(catalog)
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```

pub mod client;
pub mod config;
pub mod control;
pub mod core;
pub mod drafts;
pub mod server;
pub mod storage;
pub mod submission;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        AdminSession, Advisory, AdvisoryLevel, AuthContext, ClientSession, Clock, ControlField,
        DailySettings, DayOfWeek, DraftOrder, DraftOrderItem, DraftSummary, EventBus,
        EventEnvelope, FixedClock, ItemSource, MonthOverflow, MonthlySettings, Order,
        OrderControlPatch, OrderControlState, OrderStatus, OrderWindowPolicy, OrderingError,
        OrderingResult, StorefrontEvent, SystemClock, WeeklySettings, WindowEvaluation,
        WindowEvaluator,
    };

    // === Seams ===
    pub use crate::core::service::{
        ControlStore, ImageStorage, OrderingStore, ProductCatalog, ProductSnapshot,
    };

    // === Services ===
    pub use crate::client::{ControlView, ViewChange};
    pub use crate::control::{ControlService, ControlSnapshot, SetCustomMessage};
    pub use crate::drafts::{AddListedItem, AddUnlistedItem, DraftService, UpdateItemQuantity};
    pub use crate::submission::SubmissionGate;

    // === Storage ===
    pub use crate::storage::{FsImageStorage, InMemoryImageStorage};
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{InMemoryCatalog, InMemoryControlStore, InMemoryOrderingStore};

    // === Config ===
    pub use crate::config::{OrderingConfig, ServerConfig, StorefrontConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        routing::{delete, get, post, put},
    };
}
