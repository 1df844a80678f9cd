//! Request DTOs for the slot cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::SlotCategory;

/// Request body for PUT /slots/:key
///
/// # Fields
/// - `value`: Any JSON value to persist
/// - `category`: Optional eviction category; inferred from the key if absent
#[derive(Debug, Clone, Deserialize)]
pub struct WriteSlotRequest {
    /// The value to store
    pub value: Value,
    /// Eviction category
    #[serde(default)]
    pub category: Option<SlotCategory>,
}

impl WriteSlotRequest {
    /// Returns the explicit category or the one conventional for `key`.
    pub fn category_for(&self, key: &str) -> SlotCategory {
        self.category.unwrap_or_else(|| SlotCategory::infer(key))
    }
}
