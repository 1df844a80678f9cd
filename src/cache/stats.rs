//! Cache Statistics Module
//!
//! Tracks slot cache metrics including hits, misses, evictions and write failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks slot cache metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Opens/reads served from a durable copy
    pub hits: u64,
    /// Opens/reads that fell back to the default (absent or corrupt copy)
    pub misses: u64,
    /// Durable copies that failed to decode
    pub decode_failures: u64,
    /// Successful persists
    pub writes: u64,
    /// Slots removed by the eviction protocol
    pub evictions: u64,
    /// Writes that stayed over capacity after eviction
    pub capacity_failures: u64,
    /// Writes that failed for any non-capacity reason
    pub write_failures: u64,
    /// Number of slots currently in the store
    pub total_slots: usize,
    /// Bytes currently used in the store
    pub bytes_used: usize,
    /// Store ceiling in bytes
    pub capacity: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// A corrupt copy is both a decode failure and a miss.
    pub fn record_decode_failure(&mut self) {
        self.decode_failures += 1;
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_capacity_failure(&mut self) {
        self.capacity_failures += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    // == Update Usage ==
    /// Copies the store's current occupancy into the snapshot.
    pub fn set_usage(&mut self, total_slots: usize, bytes_used: usize, capacity: usize) {
        self.total_slots = total_slots;
        self.bytes_used = bytes_used;
        self.capacity = capacity;
    }
}
