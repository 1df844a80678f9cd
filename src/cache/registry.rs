//! Slot Cache Module
//!
//! Registry of named slots mirrored into a bounded durable store, with the
//! category-based eviction protocol that runs when a write hits the ceiling.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{
    CacheStats, CapacityWarning, EvictionQueue, LogWarningSink, Slot, SlotCategory, WarningSink,
    MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result, StoreError};
use crate::store::DurableStore;

// == Events ==
/// Why a slot's durable copy disappeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Deleted,
    Evicted,
}

/// Notification delivered to subscribers of a key.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotEvent {
    /// The slot was persisted with `value`
    Written { key: String, value: Value },
    /// The slot's durable copy was removed
    Removed { key: String, reason: RemovalReason },
}

impl SlotEvent {
    pub fn key(&self) -> &str {
        match self {
            SlotEvent::Written { key, .. } | SlotEvent::Removed { key, .. } => key,
        }
    }
}

/// Callback invoked synchronously after a slot changes.
pub type Listener = Arc<dyn Fn(&SlotEvent) + Send + Sync>;

/// Handle returned by [`SlotCache::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

// == Outcomes ==
/// Result of a successful persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub key: String,
    /// Serialized size of the persisted value
    pub bytes: usize,
    /// Slots removed to make room, in eviction order
    pub evicted: Vec<String>,
}

/// Listing entry for a known or stored slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub key: String,
    pub category: SlotCategory,
    /// Whether a durable copy exists
    pub present: bool,
}

// == Registry ==
#[derive(Default)]
struct Registry {
    queue: EvictionQueue,
    stats: CacheStats,
    listeners: HashMap<String, Vec<(SubscriptionId, Listener)>>,
    next_subscription: u64,
}

impl Registry {
    fn listeners_for<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Vec<(String, Listener)> {
        keys.into_iter()
            .flat_map(|key| {
                self.listeners
                    .get(key)
                    .into_iter()
                    .flatten()
                    .map(move |(_, listener)| (key.to_string(), Arc::clone(listener)))
            })
            .collect()
    }
}

struct Inner {
    store: Arc<dyn DurableStore>,
    warnings: Arc<dyn WarningSink>,
    registry: Mutex<Registry>,
}

// == Slot Cache ==
/// Process-wide view of named slots over one shared durable store.
///
/// Cloning is cheap; clones share the registry, the store and the warning
/// sink.
#[derive(Clone)]
pub struct SlotCache {
    inner: Arc<Inner>,
}

impl SlotCache {
    // == Constructor ==
    /// Creates a cache over `store` that logs capacity warnings.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_warning_sink(store, Arc::new(LogWarningSink))
    }

    /// Creates a cache over `store` reporting capacity warnings to `warnings`.
    pub fn with_warning_sink(store: Arc<dyn DurableStore>, warnings: Arc<dyn WarningSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                warnings,
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn DurableStore> {
        &self.inner.store
    }

    // == Open ==
    /// Opens the slot at `key`.
    ///
    /// Returns the durable copy if one exists and decodes as `T`, otherwise
    /// `default`. The default is not written. A corrupt copy is logged and
    /// replaced by the default in memory; it is never an error.
    pub fn open<T>(&self, key: impl Into<String>, category: SlotCategory, default: T) -> Result<Slot<T>>
    where
        T: DeserializeOwned,
    {
        let key = key.into();
        self.validate_key(&key)?;

        let mut registry = self.lock();
        registry.queue.register(&key, category);
        let value = self
            .decode_durable::<T>(&mut registry, &key)
            .unwrap_or(default);
        drop(registry);

        debug!("Opened slot '{}' ({})", key, category);
        Ok(Slot::new(self.clone(), key, category, value))
    }

    // == Read Raw ==
    /// Reads the durable copy of `key` as untyped JSON.
    ///
    /// Absent and corrupt copies both yield `None`.
    pub fn read_raw(&self, key: &str) -> Result<Option<Value>> {
        self.validate_key(key)?;
        let mut registry = self.lock();
        Ok(self.decode_durable::<Value>(&mut registry, key))
    }

    // == Write Raw ==
    /// Persists an untyped JSON value, running eviction on overflow.
    pub fn write_raw(&self, key: &str, category: SlotCategory, value: &Value) -> Result<WriteOutcome> {
        self.persist(key, category, value)
    }

    /// Serializes and persists a typed value. Used by [`Slot`] setters.
    pub(crate) fn persist_value<T: Serialize>(
        &self,
        key: &str,
        category: SlotCategory,
        value: &T,
    ) -> Result<WriteOutcome> {
        let json = serde_json::to_value(value).map_err(|source| {
            error!("Failed to serialize slot '{}': {}", key, source);
            self.lock().stats.record_write_failure();
            CacheError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        self.persist(key, category, &json)
    }

    // == Persist ==
    fn persist(&self, key: &str, category: SlotCategory, value: &Value) -> Result<WriteOutcome> {
        self.validate_key(key)?;
        let bytes = serde_json::to_vec(value).map_err(|source| {
            error!("Failed to serialize slot '{}': {}", key, source);
            self.lock().stats.record_write_failure();
            CacheError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;

        let store = &self.inner.store;
        let mut registry = self.lock();
        registry.queue.register(key, category);

        let mut evicted = Vec::new();
        let result = match store.write(key, &bytes) {
            Ok(()) => Ok(()),
            Err(e) if e.is_capacity() => {
                warn!("Storage quota exceeded writing '{}', attempting to free space", key);
                self.evict_and_retry(&mut registry, key, &bytes, e, &mut evicted)
            }
            Err(e) => Err(e),
        };

        let removed = registry.listeners_for(evicted.iter().map(String::as_str));
        let removed_events: Vec<SlotEvent> = evicted
            .iter()
            .map(|k| SlotEvent::Removed {
                key: k.clone(),
                reason: RemovalReason::Evicted,
            })
            .collect();

        match result {
            Ok(()) => {
                registry.queue.touch(key);
                registry.stats.record_write();
                let written = registry.listeners_for([key]);
                drop(registry);

                if !evicted.is_empty() {
                    info!("Persisted '{}' after evicting {:?}", key, evicted);
                }
                notify(&removed, &removed_events);
                let event = SlotEvent::Written {
                    key: key.to_string(),
                    value: value.clone(),
                };
                notify(&written, std::slice::from_ref(&event));

                Ok(WriteOutcome {
                    key: key.to_string(),
                    bytes: bytes.len(),
                    evicted,
                })
            }
            Err(StoreError::Capacity {
                required, available, ..
            }) => {
                registry.stats.record_capacity_failure();
                drop(registry);

                let warning = CapacityWarning {
                    key: key.to_string(),
                    required,
                    available,
                    evicted,
                };
                self.inner.warnings.warn(&warning);
                notify(&removed, &removed_events);
                Err(CacheError::StorageFull(warning.message()))
            }
            Err(e) => {
                registry.stats.record_write_failure();
                drop(registry);

                error!("Failed to persist slot '{}': {}", key, e);
                notify(&removed, &removed_events);
                Err(CacheError::Store(e))
            }
        }
    }

    // == Eviction Protocol ==
    /// Removes evictable slots one at a time, lowest category first, retrying
    /// the pending write after each removal. Returns the last error if every
    /// candidate is exhausted.
    ///
    /// Stored keys not opened in this process are candidates too, with the
    /// category inferred from their name.
    fn evict_and_retry(
        &self,
        registry: &mut Registry,
        key: &str,
        bytes: &[u8],
        first_error: StoreError,
        evicted: &mut Vec<String>,
    ) -> std::result::Result<(), StoreError> {
        let store = &self.inner.store;
        let mut last_error = first_error;

        let stored = store.keys();
        let candidates = registry
            .queue
            .candidates(key, stored.iter().map(String::as_str));

        for candidate in candidates {
            if let Err(e) = store.delete(&candidate) {
                error!("Failed to evict '{}': {}", candidate, e);
                continue;
            }

            info!(
                "Evicted '{}' ({}) to make room for '{}'",
                candidate,
                registry.queue.effective_category(&candidate),
                key
            );
            registry.queue.forget(&candidate);
            registry.stats.record_eviction();
            evicted.push(candidate);

            match store.write(key, bytes) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_capacity() => last_error = e,
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    // == Delete ==
    /// Removes the durable copy of `key`.
    ///
    /// Returns whether a copy existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.validate_key(key)?;
        let mut registry = self.lock();
        let existed = self.inner.store.contains(key);
        self.inner.store.delete(key)?;
        registry.queue.forget(key);
        let listeners = registry.listeners_for([key]);
        drop(registry);

        if existed {
            debug!("Deleted slot '{}'", key);
            let event = SlotEvent::Removed {
                key: key.to_string(),
                reason: RemovalReason::Deleted,
            };
            notify(&listeners, std::slice::from_ref(&event));
        }
        Ok(existed)
    }

    // == Subscriptions ==
    /// Registers `listener` for changes to `key`.
    pub fn subscribe<F>(&self, key: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&SlotEvent) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        registry.next_subscription += 1;
        let id = SubscriptionId(registry.next_subscription);
        registry
            .listeners
            .entry(key.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.lock();
        let mut found = false;
        registry.listeners.retain(|_, list| {
            let before = list.len();
            list.retain(|(sid, _)| *sid != id);
            found |= list.len() != before;
            !list.is_empty()
        });
        found
    }

    // == Introspection ==
    /// Returns current statistics with store occupancy filled in.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.lock().stats.clone();
        let store = &self.inner.store;
        stats.set_usage(store.keys().len(), store.usage(), store.capacity());
        stats
    }

    /// Lists every registered or stored slot, sorted by key.
    ///
    /// Stored keys never opened in this process report the category inferred
    /// from their name.
    pub fn slots(&self) -> Vec<SlotInfo> {
        let registry = self.lock();
        let mut slots: BTreeMap<String, SlotCategory> = registry
            .queue
            .iter()
            .map(|(key, category)| (key.clone(), category))
            .collect();
        drop(registry);

        let stored = self.inner.store.keys();
        for key in &stored {
            slots
                .entry(key.clone())
                .or_insert_with(|| SlotCategory::infer(key));
        }

        slots
            .into_iter()
            .map(|(key, category)| SlotInfo {
                present: stored.contains(&key),
                key,
                category,
            })
            .collect()
    }

    // == Helpers ==
    fn decode_durable<T: DeserializeOwned>(&self, registry: &mut Registry, key: &str) -> Option<T> {
        match self.inner.store.read(key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    registry.stats.record_hit();
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding corrupt durable copy of '{}': {}", key, e);
                    registry.stats.record_decode_failure();
                    None
                }
            },
            Ok(None) => {
                registry.stats.record_miss();
                None
            }
            Err(e) => {
                error!("Failed to read slot '{}': {}", key, e);
                registry.stats.record_miss();
                None
            }
        }
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
        }
        let max = self
            .inner
            .store
            .max_key_len()
            .map_or(MAX_KEY_LENGTH, |limit| limit.min(MAX_KEY_LENGTH));
        if key.len() > max {
            return Err(CacheError::InvalidKey(format!(
                "Key exceeds maximum length of {} bytes",
                max
            )));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SlotCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotCache")
            .field("usage", &self.inner.store.usage())
            .field("capacity", &self.inner.store.capacity())
            .finish()
    }
}

fn notify(listeners: &[(String, Listener)], events: &[SlotEvent]) {
    for event in events {
        for (key, listener) in listeners {
            if key == event.key() {
                listener(event);
            }
        }
    }
}
