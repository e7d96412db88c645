//! Client-side state reconciliation

pub mod view;

pub use view::{ControlView, ViewChange};
