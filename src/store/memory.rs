//! In-memory bounded store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::traits::{check_capacity, DurableStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Vec<u8>>,
    used: usize,
}

/// `HashMap` backed store with a global byte ceiling.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl MemoryStore {
    /// Creates an empty store holding at most `capacity` value bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
        }
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let old_len = inner.entries.get(key).map_or(0, Vec::len);
        check_capacity(key, inner.used, old_len, bytes.len(), self.capacity)?;

        inner.used = inner.used - old_len + bytes.len();
        inner.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(old) = inner.entries.remove(key) {
            inner.used -= old.len();
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    fn usage(&self) -> usize {
        self.lock().used
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
