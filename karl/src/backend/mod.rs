//! Pluggable storage for completed preloads.
//!
//! Each backend implements [`PreloadBackend`]. A backend's lifetime is
//! independent of any coordinator: it may be shared by several
//! [`Preloader`](crate::Preloader)s, each of which keeps its own private
//! in-flight registry.
//!
//! # Available Backends
//!
//! - [`MemoryBackend`]: unbounded map, the default
//! - [`BoundedBackend`]: moka cache with an entry ceiling
//!
//! ```ignore
//! use std::sync::Arc;
//! use karl::{BoundedBackend, Preloader};
//!
//! let preloader = Preloader::with_backend(Arc::new(BoundedBackend::new(256)));
//! ```

mod bounded;
mod memory;
mod traits;

pub use bounded::{BoundedBackend, DEFAULT_MAX_ENTRIES};
pub use memory::MemoryBackend;
pub use traits::PreloadBackend;
