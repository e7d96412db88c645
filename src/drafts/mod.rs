//! Draft order aggregate: item operations and HTTP handlers

pub mod handlers;
pub mod service;

pub use service::{AddListedItem, AddUnlistedItem, DraftService, ImageUpload, UpdateItemQuantity};
