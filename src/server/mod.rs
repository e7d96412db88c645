//! HTTP + WebSocket server for the storefront
//!
//! `ServerBuilder` wires stores and collaborators into a `ServerHost`;
//! the exposures turn the host into routers.

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
#[cfg(feature = "websocket")]
pub use exposure::WebSocketExposure;
pub use host::{HostComponents, ServerHost};
pub use router::AppState;
