//! Bounded in-memory backend using moka.
//!
//! This backend wraps `moka::sync::Cache` for hosts that want a ceiling on how
//! many preloaded assets stay resident. Entries beyond the capacity are
//! evicted by moka; an evicted key simply reads as not contained and is
//! loaded again on the next request.
//!
//! The preloader itself has no eviction policy. This type exists to show how
//! a custom store plugs in through [`Preloader::with_backend`](crate::Preloader::with_backend).

use moka::sync::Cache as MokaCache;

use crate::asset::AssetValue;
use crate::backend::traits::PreloadBackend;

/// Default maximum number of entries for a bounded backend.
pub const DEFAULT_MAX_ENTRIES: u64 = 1024;

/// Capacity-limited backend.
pub struct BoundedBackend {
    cache: MokaCache<String, Option<AssetValue>>,
    max_entries: u64,
}

impl BoundedBackend {
    /// Create a backend holding at most `max_entries` keys.
    ///
    /// Failure sentinels count towards the limit.
    pub fn new(max_entries: u64) -> Self {
        let cache = MokaCache::builder().max_capacity(max_entries).build();
        Self { cache, max_entries }
    }

    /// The configured capacity.
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    /// Approximate number of resident entries.
    ///
    /// Runs moka's pending maintenance first so recent inserts and evictions
    /// are reflected.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for BoundedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl std::fmt::Debug for BoundedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBackend")
            .field("max_entries", &self.max_entries)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl PreloadBackend for BoundedBackend {
    fn contains(&self, key: &str) -> bool {
        matches!(self.cache.get(key), Some(Some(_)))
    }

    fn set(&self, key: &str, value: Option<AssetValue>) {
        self.cache.insert(key.to_string(), value);
    }
}
