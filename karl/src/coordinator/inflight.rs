//! In-flight load registry.
//!
//! Maps a key to the single shared pending handle for its load. The registry
//! itself is a plain map; the [`Preloader`](super::Preloader) wraps it in a
//! mutex and performs every check-then-register and remove-then-record step
//! while holding that lock.

use std::collections::HashMap;

use super::Pending;

/// Key → pending handle for loads that have not settled.
pub(crate) struct InFlightRegistry<T> {
    entries: HashMap<String, Pending<T>>,
}

impl<T> InFlightRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns a clone of the pending handle for `key`, if one is registered.
    pub(crate) fn get(&self, key: &str) -> Option<Pending<T>>
    where
        T: Clone,
    {
        self.entries.get(key).cloned()
    }

    /// Registers `pending` for `key`.
    ///
    /// Callers check [`get`](Self::get) under the same lock first, so an
    /// existing entry is never replaced.
    pub(crate) fn insert(&mut self, key: String, pending: Pending<T>) {
        let previous = self.entries.insert(key, pending);
        debug_assert!(previous.is_none(), "in-flight entry replaced");
    }

    /// Removes the entry for `key`, returning whether one existed.
    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
