//! Process-wide default preloader.
//!
//! The default [`Preloader`] is created on first use with a fresh
//! [`MemoryBackend`] and the standard environment, then lives for the rest of
//! the process. It is never reset. Tests should build their own preloader
//! with [`with_backend`] instead of sharing this one.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::asset::AssetHandle;
use crate::backend::{MemoryBackend, PreloadBackend};
use crate::coordinator::{Pending, Preloader};

static DEFAULT_PRELOADER: OnceLock<Preloader> = OnceLock::new();

/// Returns the default preloader, creating it on first access.
pub fn default_preloader() -> &'static Preloader {
    DEFAULT_PRELOADER.get_or_init(|| {
        debug!("Creating default preloader");
        Preloader::with_backend(Arc::new(MemoryBackend::new()))
    })
}

/// Preloads an image through the default preloader.
pub fn preload<'a>(source: impl Into<Option<&'a str>>) -> Pending<AssetHandle> {
    default_preloader().preload(source)
}

/// Preloads a Material icon glyph through the default preloader.
pub fn preload_icon<'a>(icon_name: impl Into<Option<&'a str>>) -> Pending<String> {
    default_preloader().preload_icon(icon_name)
}

/// Creates a new preloader bound to a caller-supplied backend.
pub fn with_backend(backend: Arc<dyn PreloadBackend>) -> Preloader {
    Preloader::with_backend(backend)
}
