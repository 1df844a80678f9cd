//! Slot Module
//!
//! Typed handle over one named slot: the consumer's in-memory value plus its
//! bound setter.

use std::fmt;

use serde::Serialize;

use crate::cache::{SlotCache, SlotCategory, WriteOutcome};
use crate::error::Result;

// == Update ==
/// Next value for a slot: either a replacement or a function of the current
/// value.
pub enum Update<T> {
    Replace(T),
    With(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
    /// Wraps a read-modify-write closure.
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        Update::With(Box::new(f))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            Update::Replace(value) => value,
            Update::With(f) => f(current),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

// == Slot ==
/// One consumer's view of a named slot.
///
/// The in-memory value is updated before every persist attempt, so it always
/// reflects the latest write even when the durable copy could not be updated.
pub struct Slot<T> {
    cache: SlotCache,
    key: String,
    category: SlotCategory,
    value: T,
}

impl<T> Slot<T> {
    pub(crate) fn new(cache: SlotCache, key: String, category: SlotCategory, value: T) -> Self {
        Self {
            cache,
            key,
            category,
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> SlotCategory {
        self.category
    }

    /// Current in-memory value.
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize> Slot<T> {
    // == Set ==
    /// Replaces the value and persists it.
    pub fn set(&mut self, value: T) -> Result<WriteOutcome> {
        self.apply(Update::Replace(value))
    }

    // == Update ==
    /// Computes the next value from the current one and persists it.
    pub fn update<F>(&mut self, f: F) -> Result<WriteOutcome>
    where
        F: FnOnce(&T) -> T,
    {
        self.value = f(&self.value);
        self.persist()
    }

    // == Apply ==
    /// Applies either form of update and persists the result.
    ///
    /// On error the in-memory value keeps the update; the durable copy stays
    /// at its last successful state.
    pub fn apply(&mut self, update: impl Into<Update<T>>) -> Result<WriteOutcome> {
        self.value = update.into().resolve(&self.value);
        self.persist()
    }

    fn persist(&self) -> Result<WriteOutcome> {
        self.cache.persist_value(&self.key, self.category, &self.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("key", &self.key)
            .field("category", &self.category)
            .field("value", &self.value)
            .finish()
    }
}
