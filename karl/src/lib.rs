//! Karl - preload images and icon glyphs before they are needed
//!
//! This library warms image sources and icon-font glyphs ahead of the moment a
//! view needs them, so screens do not render blank while assets trickle in.
//!
//! # Architecture
//!
//! ```text
//! preload("a.png") ──► Preloader ──► Backend hit? ──► resolve with key
//!                          │
//!                          ├──► In-flight? ──► join the shared pending handle
//!                          │
//!                          └──► Surface launch ──► Completion ──► settle
//!                                                   (loaded / failed)
//! ```
//!
//! - [`backend`]: pluggable key-value store recording completed loads
//! - [`coordinator`]: the deduplicating [`Preloader`]
//! - [`environment`]: the surfaces that actually fetch images or warm glyphs
//! - [`global`]: a lazily created process-wide default preloader
//!
//! # Example
//!
//! ```ignore
//! let handle = karl::preload("https://example.com/hero.png").await?;
//! let icon = karl::preload_icon("favorite").await?;
//! ```

pub mod asset;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod environment;
pub mod error;
pub mod global;
pub mod logging;
pub mod telemetry;

pub use asset::{AssetHandle, AssetKey, AssetKind, AssetValue, LoadedImage};
pub use backend::{BoundedBackend, MemoryBackend, PreloadBackend};
pub use config::PreloaderConfig;
pub use coordinator::{Pending, Preloader};
pub use environment::Environment;
pub use error::PreloadError;
pub use global::{default_preloader, preload, preload_icon, with_backend};

/// Library version, as published in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
