//! Order control state: admin mutations, client snapshot, expiry sweeping

pub mod handlers;
pub mod service;

pub use service::{ControlService, ControlSnapshot, SetCustomMessage};
