//! Core module containing the domain types, traits and events of the engine

pub mod auth;
pub mod clock;
pub mod control;
pub mod draft;
pub mod error;
pub mod events;
pub mod extractors;
pub mod order;
pub mod service;
pub mod window;

pub use auth::AuthContext;
pub use clock::{Clock, FixedClock, SystemClock};
pub use control::{ControlField, OrderControlPatch, OrderControlState};
pub use draft::{DraftOrder, DraftOrderItem, DraftStatus, DraftSummary, ItemSource};
pub use error::{OrderingError, OrderingResult};
pub use events::{EventBus, EventEnvelope, StorefrontEvent};
pub use extractors::{AdminSession, ClientSession};
pub use order::{Order, OrderStatus};
pub use service::{ControlStore, ImageStorage, OrderingStore, ProductCatalog, ProductSnapshot};
pub use window::{
    Advisory, AdvisoryLevel, AdvisoryTemplates, DailySettings, DayOfWeek, MonthOverflow,
    MonthlySettings, OrderWindowPolicy, PolicyError, TemplateError, WeeklySettings, WindowEvaluation,
    WindowEvaluator,
};
