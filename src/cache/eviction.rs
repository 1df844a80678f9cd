//! Eviction Queue Module
//!
//! Tracks the category and write recency of every known slot and produces the
//! order in which the eviction protocol sacrifices them.
//!
//! Keys opened in this process stay registered until they are deleted or
//! evicted, so the queue grows with the number of distinct keys opened.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::cache::SlotCategory;

// == Eviction Queue ==
/// Known slots ordered by write recency.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently written
/// - Back = Least recently written (or opened but never written)
#[derive(Debug, Default)]
pub struct EvictionQueue {
    /// Order of keys by write time
    order: VecDeque<String>,
    /// Category of every registered key
    categories: HashMap<String, SlotCategory>,
}

impl EvictionQueue {
    // == Constructor ==
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Records `key` with `category`.
    ///
    /// New keys enter at the back so a slot that was only opened is the first
    /// candidate within its category. Re-registering updates the category
    /// without changing recency.
    pub fn register(&mut self, key: &str, category: SlotCategory) {
        if self.categories.insert(key.to_string(), category).is_none() {
            self.order.push_back(key.to_string());
        }
    }

    // == Touch ==
    /// Marks a key as most recently written (moves to front).
    pub fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }

    // == Forget ==
    /// Removes a key from the queue entirely.
    pub fn forget(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.categories.remove(key);
    }

    // == Category ==
    /// Returns the registered category of `key`, if known.
    pub fn category(&self, key: &str) -> Option<SlotCategory> {
        self.categories.get(key).copied()
    }

    // == Candidates ==
    /// Returns evictable keys present in `stored` other than `exclude`, lowest
    /// category first and least recently written first within a category.
    ///
    /// Stored keys that were never registered take the category inferred from
    /// their name and rank as the oldest in that category, in key order.
    /// Primary slots never appear.
    pub fn candidates<'a>(&self, exclude: &str, stored: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let stored: BTreeSet<&str> = stored.into_iter().filter(|key| *key != exclude).collect();
        let stored = &stored;

        SlotCategory::EVICTABLE
            .iter()
            .flat_map(|category| {
                let unregistered = stored.iter().copied().filter(move |key| {
                    !self.categories.contains_key(*key) && SlotCategory::infer(key) == *category
                });
                let registered = self
                    .order
                    .iter()
                    .rev()
                    .map(String::as_str)
                    .filter(move |key| {
                        self.categories.get(*key) == Some(category) && stored.contains(key)
                    });
                unregistered.chain(registered)
            })
            .map(str::to_string)
            .collect()
    }

    /// Category used for eviction: the registered one, else inferred from the
    /// key name.
    pub fn effective_category(&self, key: &str) -> SlotCategory {
        self.category(key).unwrap_or_else(|| SlotCategory::infer(key))
    }

    /// Iterates over registered keys with their categories.
    pub fn iter(&self) -> impl Iterator<Item = (&String, SlotCategory)> {
        self.categories.iter().map(|(k, c)| (k, *c))
    }

    // == Length ==
    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
