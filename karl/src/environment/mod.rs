//! The environment the preloader runs in.
//!
//! An [`Environment`] bundles the optional surfaces that perform the actual
//! loading side effects. A missing surface is not an error at construction
//! time; requests that need it fail with
//! [`PreloadError::EnvironmentUnavailable`](crate::PreloadError::EnvironmentUnavailable).
//!
//! # Available Surfaces
//!
//! - [`HttpImageSurface`]: fetches (or reads) and decodes image sources
//! - [`MemoryDocument`]: in-process document body for icon warm-up elements

mod completion;
mod document;
mod element;
mod http;
mod traits;

use std::sync::Arc;

use tracing::warn;

pub use completion::Completion;
pub(crate) use completion::CompletionReceiver;
pub use document::MemoryDocument;
pub use element::{
    IconElement, IconStyle, DEFAULT_EXTRA_CLASSES, DEFAULT_ICON_CLASS, DEFAULT_MARKER_PREFIX,
};
pub use http::{HttpImageSurface, DEFAULT_USER_AGENT};
pub use traits::{GlyphSurface, ImageSurface, SurfaceError};

use crate::config::PreloaderConfig;

/// Surfaces available to a preloader.
#[derive(Clone, Default)]
pub struct Environment {
    images: Option<Arc<dyn ImageSurface>>,
    glyphs: Option<Arc<dyn GlyphSurface>>,
}

impl Environment {
    /// An environment with no surfaces; every load is unavailable.
    pub fn headless() -> Self {
        Self::default()
    }

    /// Builds the standard environment from configuration.
    ///
    /// Images go through [`HttpImageSurface`]; icons are appended to a fresh
    /// [`MemoryDocument`]. If the HTTP client cannot be created, image loads
    /// are left unavailable rather than failing construction.
    pub fn detect(config: &PreloaderConfig) -> Self {
        let environment = Self::headless().with_glyphs(Arc::new(MemoryDocument::new()));

        match HttpImageSurface::with_options(&config.http.user_agent, config.http.timeout) {
            Ok(surface) => environment.with_images(Arc::new(surface)),
            Err(e) => {
                warn!(error = %e, "Image surface unavailable");
                environment
            }
        }
    }

    /// Sets the image surface.
    pub fn with_images(mut self, surface: Arc<dyn ImageSurface>) -> Self {
        self.images = Some(surface);
        self
    }

    /// Sets the glyph surface.
    pub fn with_glyphs(mut self, surface: Arc<dyn GlyphSurface>) -> Self {
        self.glyphs = Some(surface);
        self
    }

    /// The image surface, if any.
    pub fn images(&self) -> Option<&Arc<dyn ImageSurface>> {
        self.images.as_ref()
    }

    /// The glyph surface, if any.
    pub fn glyphs(&self) -> Option<&Arc<dyn GlyphSurface>> {
        self.glyphs.as_ref()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("images", &self.images.is_some())
            .field("glyphs", &self.glyphs.is_some())
            .finish()
    }
}
