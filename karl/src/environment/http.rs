//! Image surface backed by reqwest and the `image` crate.
//!
//! Remote sources (`http://`, `https://`) are fetched with an async reqwest
//! client; anything else is treated as a local path (a `file://` prefix is
//! stripped). The bytes are decoded on the blocking pool so large images do
//! not stall the runtime.

use std::time::Duration;

use tracing::debug;

use crate::asset::LoadedImage;
use crate::environment::completion::Completion;
use crate::environment::traits::{ImageSurface, SurfaceError};

/// Default user agent sent with image requests.
pub const DEFAULT_USER_AGENT: &str = concat!("karl/", env!("CARGO_PKG_VERSION"));

/// Image surface that downloads and decodes sources into memory.
#[derive(Debug, Clone)]
pub struct HttpImageSurface {
    client: reqwest::Client,
}

impl HttpImageSurface {
    /// Creates a surface with the default user agent and no request timeout.
    pub fn new() -> Result<Self, SurfaceError> {
        Self::with_options(DEFAULT_USER_AGENT, None)
    }

    /// Creates a surface with a custom user agent and optional timeout.
    ///
    /// Without a timeout a stalled server leaves the load pending.
    pub fn with_options(
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, SurfaceError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            SurfaceError::Unavailable(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_source(&self, source: &str) -> Result<Vec<u8>, SurfaceError> {
        if is_remote(source) {
            let response = self
                .client
                .get(source)
                .send()
                .await
                .map_err(|e| SurfaceError::LoadFailed(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(SurfaceError::LoadFailed(format!(
                    "HTTP {} from {}",
                    response.status(),
                    source
                )));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| SurfaceError::LoadFailed(format!("Failed to read response: {}", e)))
        } else {
            let path = source.strip_prefix("file://").unwrap_or(source);
            tokio::fs::read(path)
                .await
                .map_err(|e| SurfaceError::LoadFailed(format!("Failed to read {}: {}", path, e)))
        }
    }

    async fn fetch(&self, source: String) -> Result<LoadedImage, SurfaceError> {
        let bytes = self.read_source(&source).await?;
        debug!(source = %source, bytes = bytes.len(), "Image bytes received");

        tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes)
                .map(|image| LoadedImage::new(source, image))
                .map_err(|e| SurfaceError::LoadFailed(format!("Failed to decode image: {}", e)))
        })
        .await
        .map_err(|e| SurfaceError::Construction(format!("Decode task failed: {}", e)))?
    }
}

impl ImageSurface for HttpImageSurface {
    fn load_image(&self, source: &str, completion: Completion<LoadedImage>) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                completion.failed(SurfaceError::Unavailable(
                    "no Tokio runtime to drive the image fetch".to_string(),
                ));
                return;
            }
        };

        let surface = self.clone();
        let source = source.to_string();
        runtime.spawn(async move {
            completion.settle(surface.fetch(source).await);
        });
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
