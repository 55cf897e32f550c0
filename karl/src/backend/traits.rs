//! Core trait for preload storage backends.
//!
//! A backend records which assets have finished loading. The coordinator
//! only ever asks two things of it: is this key hot, and record this outcome.
//!
//! # Design Principles
//!
//! - **String keys**: image sources and icon names share one namespace
//! - **Failure sentinel**: `set(key, None)` records "attempted and failed",
//!   which must read back as not contained so the next request retries
//! - **Infallible**: neither operation reports errors; a backend that can fail
//!   internally must degrade to "not contained"
//! - **Dyn-compatible**: used as `Arc<dyn PreloadBackend>` and shareable
//!   across coordinators

use crate::asset::AssetValue;

/// Key-value store recording completed preloads.
///
/// Any conforming type is interchangeable, including test doubles that count
/// calls or simulate latency.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. A backend shared between several
/// coordinators sees interleaved calls from all of them.
pub trait PreloadBackend: Send + Sync {
    /// Returns true iff a successfully loaded value is recorded for `key`.
    fn contains(&self, key: &str) -> bool;

    /// Upserts the entry for `key`.
    ///
    /// `Some(value)` records a successful load. `None` is the failure
    /// sentinel: the key is remembered as attempted but is not considered
    /// loaded.
    fn set(&self, key: &str, value: Option<AssetValue>);
}
