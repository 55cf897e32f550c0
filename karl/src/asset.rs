//! Asset identifiers and loaded asset values.
//!
//! An asset is identified by a plain string key: an image source (URL or
//! local path) or an icon name. Keys are validated once at the preload
//! boundary via [`AssetKey::parse`], after which they are guaranteed non-empty.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;

use crate::error::PreloadError;

/// The kinds of asset the preloader knows how to warm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// An image source fetched and decoded into memory.
    Image,
    /// A Material icon-font glyph warmed through a hidden element.
    MaterialIcon,
}

impl AssetKind {
    /// Short human-readable name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::MaterialIcon => "material-icon",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated, non-empty asset key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// Validates a raw key for the given operation.
    ///
    /// `None` and the empty string are both rejected with
    /// [`PreloadError::InvalidArgument`].
    pub fn parse(
        raw: Option<&str>,
        kind: AssetKind,
        operation: &'static str,
    ) -> Result<Self, PreloadError> {
        match raw {
            Some(key) if !key.is_empty() => Ok(Self(key.to_string())),
            _ => Err(PreloadError::InvalidArgument { operation, kind }),
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A decoded image held in memory.
///
/// Keeping the decoded pixels reachable from the backend is what keeps the
/// asset warm; dropping every reference releases it.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    source: String,
    image: DynamicImage,
}

impl LoadedImage {
    /// Wraps a decoded image loaded from `source`.
    pub fn new(source: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            source: source.into(),
            image,
        }
    }

    /// The source the image was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The decoded image.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// A value recorded in a backend for a successfully loaded asset.
#[derive(Debug, Clone)]
pub enum AssetValue {
    /// A decoded image.
    Image(Arc<LoadedImage>),
    /// A warmed icon glyph, identified by its name.
    Icon(String),
}

impl AssetValue {
    /// The kind of asset this value holds.
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetValue::Image(_) => AssetKind::Image,
            AssetValue::Icon(_) => AssetKind::MaterialIcon,
        }
    }
}

/// Result of a successful image preload.
///
/// A cache hit resolves with the key alone; a fresh load also carries the
/// decoded image, shared between every caller that joined the load.
#[derive(Debug, Clone)]
pub struct AssetHandle {
    key: String,
    image: Option<Arc<LoadedImage>>,
}

impl AssetHandle {
    /// Handle for a key that was already present in the backend.
    pub fn cached(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            image: None,
        }
    }

    /// Handle for a freshly loaded image.
    pub fn loaded(key: impl Into<String>, image: Arc<LoadedImage>) -> Self {
        Self {
            key: key.into(),
            image: Some(image),
        }
    }

    /// The asset key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The decoded image, if this handle came from a fresh load.
    pub fn image(&self) -> Option<&Arc<LoadedImage>> {
        self.image.as_ref()
    }

    /// True when the request was satisfied by the backend without loading.
    pub fn is_cache_hit(&self) -> bool {
        self.image.is_none()
    }
}
