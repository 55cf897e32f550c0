//! Surface traits: the side effects the preloader delegates.
//!
//! The coordinator decides *whether* to load; a surface decides *how*. Both
//! launch methods return immediately and report the outcome later through
//! the supplied [`Completion`].

use thiserror::Error;

use crate::asset::LoadedImage;
use crate::environment::completion::Completion;
use crate::environment::element::IconElement;

/// Errors reported by surfaces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface cannot perform loads in this context.
    #[error("surface unavailable: {0}")]
    Unavailable(String),

    /// The asset itself failed to load (network, decode, ...).
    #[error("load failed: {0}")]
    LoadFailed(String),

    /// Building or inserting the loading element failed.
    #[error("element construction failed: {0}")]
    Construction(String),
}

/// A surface able to fetch and decode images.
pub trait ImageSurface: Send + Sync {
    /// Starts loading `source`.
    ///
    /// Must not block. The completion is fired once, possibly from another
    /// task, with the decoded image or the reason the load failed.
    fn load_image(&self, source: &str, completion: Completion<LoadedImage>);
}

/// A surface able to host icon warm-up elements.
pub trait GlyphSurface: Send + Sync {
    /// Inserts `element` so its glyph starts loading.
    ///
    /// The completion is fired once the element is in place.
    fn insert_icon(&self, element: IconElement, completion: Completion<()>);
}
