//! Capacity warnings surfaced when eviction cannot make room for a write.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::error;

// == Capacity Warning ==
/// A write that could not be persisted even after evicting every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityWarning {
    /// Slot whose write failed
    pub key: String,
    /// Bytes the write needed
    pub required: usize,
    /// Bytes still available after eviction
    pub available: usize,
    /// Slots removed while trying to make room
    pub evicted: Vec<String>,
}

impl CapacityWarning {
    /// User-facing description of the condition.
    pub fn message(&self) -> String {
        format!(
            "Storage is full: could not save '{}' ({} bytes needed, {} available). \
             Delete old enquiries or records to make room.",
            self.key, self.required, self.available
        )
    }
}

// == Warning Sink ==
/// Receives capacity warnings synchronously, once per failed write.
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: &CapacityWarning);
}

/// Default sink: logs the warning at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warn(&self, warning: &CapacityWarning) {
        error!("{}", warning.message());
    }
}

/// Sink that keeps every warning for later inspection.
#[derive(Debug, Default)]
pub struct RecordingWarningSink {
    warnings: Mutex<Vec<CapacityWarning>>,
}

impl RecordingWarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded warnings.
    pub fn take(&self) -> Vec<CapacityWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WarningSink for RecordingWarningSink {
    fn warn(&self, warning: &CapacityWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }
}
