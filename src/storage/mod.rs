//! Storage implementations

pub mod images;
#[cfg(feature = "in-memory")]
pub mod in_memory;

pub use images::{FsImageStorage, InMemoryImageStorage};
#[cfg(feature = "in-memory")]
pub use in_memory::{
    InMemoryCatalog, InMemoryControlStore, InMemoryOrderingStore, RestockFlag,
};
