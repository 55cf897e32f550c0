//! Preload telemetry for observability.
//!
//! Lock-free counters recorded by the [`Preloader`](crate::Preloader) on every
//! request, plus a point-in-time snapshot for display.
//!
//! # Architecture
//!
//! ```text
//! Preloader ─────► PreloadMetrics ─────► MetricsSnapshot ─────► Views
//!                  (atomic counters)     (point-in-time copy)   (CLI, logs)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let preloader = karl::Preloader::with_backend(backend);
//! let _ = preloader.preload("a.png").await;
//!
//! let snapshot = preloader.metrics().snapshot();
//! println!("Loads started: {}", snapshot.loads_started);
//! ```

mod metrics;
mod snapshot;

pub use metrics::PreloadMetrics;
pub use snapshot::MetricsSnapshot;
