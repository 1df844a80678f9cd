//! Cache Module
//!
//! Named, typed slots mirrored into a bounded durable store, with
//! category-based eviction when the store runs out of space.

mod category;
mod eviction;
mod registry;
mod slot;
mod stats;
mod warning;


// Re-export public types
pub use category::SlotCategory;
pub use eviction::EvictionQueue;
pub use registry::{
    Listener, RemovalReason, SlotCache, SlotEvent, SlotInfo, SubscriptionId, WriteOutcome,
};
pub use slot::{Slot, Update};
pub use stats::CacheStats;
pub use warning::{CapacityWarning, LogWarningSink, RecordingWarningSink, WarningSink};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default store ceiling: the ~5 MB quota browsers give local storage
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;
