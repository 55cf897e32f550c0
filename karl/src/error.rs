//! Preload error types.
//!
//! Every failure is recovered at the [`Preloader`](crate::Preloader) boundary
//! and delivered as a value. A single outcome is cloned to every caller that
//! joined the same in-flight load, which is why [`PreloadError`] is `Clone`.

use thiserror::Error;

use crate::asset::AssetKind;
use crate::environment::SurfaceError;

/// Errors delivered by preload operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreloadError {
    /// An empty key was passed to a preload operation.
    #[error("Invalid argument: {operation}() requires a non-empty {kind} key")]
    InvalidArgument {
        /// Operation that rejected the key.
        operation: &'static str,
        /// Asset kind the key was meant for.
        kind: AssetKind,
    },

    /// The surface needed to perform the load does not exist.
    #[error("Environment unavailable for {kind} loads: {reason}")]
    EnvironmentUnavailable {
        /// Asset kind that could not be loaded.
        kind: AssetKind,
        /// Why the environment is missing.
        reason: String,
    },

    /// The environment reported a load error for this asset.
    #[error("Failed to load {key}: {reason}")]
    UnderlyingLoadFailure {
        /// Asset key.
        key: String,
        /// Reason reported by the surface.
        reason: String,
    },

    /// Constructing or inserting the loading element failed.
    #[error("Unexpected failure while loading {key}: {reason}")]
    UnexpectedFailure {
        /// Asset key.
        key: String,
        /// Description of the failure.
        reason: String,
    },
}

impl PreloadError {
    /// Converts a surface-reported error for `key` into a preload error.
    pub fn from_surface(kind: AssetKind, key: &str, err: SurfaceError) -> Self {
        match err {
            SurfaceError::Unavailable(reason) => {
                PreloadError::EnvironmentUnavailable { kind, reason }
            }
            SurfaceError::LoadFailed(reason) => PreloadError::UnderlyingLoadFailure {
                key: key.to_string(),
                reason,
            },
            SurfaceError::Construction(reason) => PreloadError::UnexpectedFailure {
                key: key.to_string(),
                reason,
            },
        }
    }

    /// Returns true for failures reported by the environment for a specific asset.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, PreloadError::UnderlyingLoadFailure { .. })
    }
}
