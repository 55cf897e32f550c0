//! Default in-memory backend.
//!
//! A single concurrent map living for the lifetime of the process. There is
//! no eviction and no size bound: every preloaded asset stays reachable until
//! the backend is dropped.

use dashmap::DashMap;

use crate::asset::AssetValue;
use crate::backend::traits::PreloadBackend;

/// Unbounded in-memory backend using dashmap.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Option<AssetValue>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded keys, including failure sentinels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the recorded value for `key`, if it loaded successfully.
    pub fn get(&self, key: &str) -> Option<AssetValue> {
        self.entries.get(key).and_then(|entry| entry.value().clone())
    }
}

impl PreloadBackend for MemoryBackend {
    fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.value().is_some())
            .unwrap_or(false)
    }

    fn set(&self, key: &str, value: Option<AssetValue>) {
        self.entries.insert(key.to_string(), value);
    }
}
