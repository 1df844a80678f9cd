//! Slot Cache - Durably mirrored key-value slots under a shared byte quota
//!
//! Consumers open named, typed slots; every write is mirrored into a bounded
//! store, and lower-priority slots are evicted when a write would overflow it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{Slot, SlotCache, SlotCategory};
pub use config::Config;
pub use store::{DurableStore, FileStore, MemoryStore};
