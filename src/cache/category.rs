//! Slot Category Module
//!
//! Eviction categories attached to slots when they are opened.

use serde::{Deserialize, Serialize};

// == Slot Category ==
/// Eviction priority of a slot, lowest first.
///
/// - `Ephemeral`: derived or transient data (notifications)
/// - `Conversational`: append-only message threads (enquiries)
/// - `Primary`: records the application cannot rebuild; never evicted
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    Ephemeral,
    Conversational,
    #[default]
    Primary,
}

impl SlotCategory {
    /// Categories the eviction protocol may sacrifice, in eviction order.
    pub const EVICTABLE: [SlotCategory; 2] = [SlotCategory::Ephemeral, SlotCategory::Conversational];

    // == Infer ==
    /// Maps the conventional key names used by the classroom front end to a
    /// category. Unknown keys are treated as primary records.
    pub fn infer(key: &str) -> Self {
        if key == "notifications" || key.starts_with("notifications-") {
            SlotCategory::Ephemeral
        } else if key == "enquiries" || key.starts_with("enquiries-") {
            SlotCategory::Conversational
        } else {
            SlotCategory::Primary
        }
    }

    /// Lowercase name as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotCategory::Ephemeral => "ephemeral",
            SlotCategory::Conversational => "conversational",
            SlotCategory::Primary => "primary",
        }
    }
}

impl std::fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
