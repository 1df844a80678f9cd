//! Response DTOs for the slot cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, SlotCategory, SlotInfo, WriteOutcome};

/// Response body for GET /slots/:key
#[derive(Debug, Clone, Serialize)]
pub struct ReadSlotResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl ReadSlotResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /slots/:key
#[derive(Debug, Clone, Serialize)]
pub struct WriteSlotResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
    /// Category the slot was written under
    pub category: SlotCategory,
    /// Serialized size in bytes
    pub bytes: usize,
    /// Slots evicted to make room
    pub evicted: Vec<String>,
}

impl WriteSlotResponse {
    /// Creates a new WriteSlotResponse from a persist outcome
    pub fn new(outcome: WriteOutcome, category: SlotCategory) -> Self {
        Self {
            message: format!("Key '{}' saved successfully", outcome.key),
            key: outcome.key,
            category,
            bytes: outcome.bytes,
            evicted: outcome.evicted,
        }
    }
}

/// Response body for DELETE /slots/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for GET /slots
#[derive(Debug, Clone, Serialize)]
pub struct SlotListResponse {
    pub slots: Vec<SlotInfo>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Fraction of the store ceiling in use
    pub utilization: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        let utilization = if stats.capacity > 0 {
            stats.bytes_used as f64 / stats.capacity as f64
        } else {
            0.0
        };
        Self {
            stats,
            hit_rate,
            utilization,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
