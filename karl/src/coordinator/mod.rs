//! The deduplicating load coordinator.
//!
//! [`Preloader`] answers "make sure this asset is loaded" for image sources
//! and icon names. Each call is resolved in one of four ways:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Preloader                              │
//! │                                                                   │
//! │  key ──► ┌────────────┐                                           │
//! │          │  Validate  │──► empty ──► InvalidArgument              │
//! │          └─────┬──────┘                                           │
//! │                ▼                                                  │
//! │          ┌────────────┐                                           │
//! │          │  Backend   │──► hit ──► resolve with key               │
//! │          └─────┬──────┘                                           │
//! │                ▼                                                  │
//! │          ┌────────────┐                                           │
//! │          │ In-flight  │──► registered ──► join shared handle      │
//! │          └─────┬──────┘                                           │
//! │                ▼                                                  │
//! │          ┌────────────┐                                           │
//! │          │  Surface   │──► launch, register, settle on completion │
//! │          └────────────┘                                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All four steps run synchronously inside the call, so two back-to-back
//! calls share a handle even before either is polled. Settlement runs in a
//! spawned task: dropping every handle does not stop a load, and there is no
//! timeout, so a load whose completion never fires stays pending. If the
//! settle task itself is torn down (its runtime shuts down), the load is
//! recorded as failed and the key can be requested again.

mod inflight;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::asset::{AssetHandle, AssetKey, AssetKind, AssetValue, LoadedImage};
use crate::backend::PreloadBackend;
use crate::config::PreloaderConfig;
use crate::environment::{
    Completion, CompletionReceiver, Environment, IconElement, IconStyle, SurfaceError,
};
use crate::error::PreloadError;
use crate::telemetry::PreloadMetrics;

use inflight::InFlightRegistry;

/// A shared, possibly unsettled preload outcome.
///
/// Clones observe the same result. Use [`Shared::ptr_eq`] to check whether two
/// calls joined the same load.
pub type Pending<T> = Shared<BoxFuture<'static, Result<T, PreloadError>>>;

type Registry<T> = Arc<Mutex<InFlightRegistry<T>>>;

/// Per-kind request path: the operation name reported on bad keys and the
/// in-flight registry loads of this kind are deduplicated in.
struct Lane<T> {
    kind: AssetKind,
    operation: &'static str,
    registry: Registry<T>,
}

impl<T> Lane<T> {
    fn new(kind: AssetKind, operation: &'static str) -> Self {
        Self {
            kind,
            operation,
            registry: Arc::new(Mutex::new(InFlightRegistry::new())),
        }
    }
}

/// Preload coordinator bound to one backend.
///
/// The backend may be shared with other preloaders; the in-flight registries
/// belong to this instance alone.
pub struct Preloader {
    backend: Arc<dyn PreloadBackend>,
    environment: Environment,
    icon_style: IconStyle,
    images: Lane<AssetHandle>,
    icons: Lane<String>,
    metrics: Arc<PreloadMetrics>,
}

impl Preloader {
    /// Creates a preloader on `backend` with the standard environment.
    pub fn with_backend(backend: Arc<dyn PreloadBackend>) -> Self {
        Self::with_parts(
            backend,
            Environment::detect(&PreloaderConfig::default()),
            IconStyle::default(),
        )
    }

    /// Creates a preloader whose backend, surfaces and icon classes come from
    /// `config`.
    pub fn from_config(config: &PreloaderConfig) -> Self {
        Self::with_parts(
            config.build_backend(),
            Environment::detect(config),
            config.icons.clone(),
        )
    }

    fn with_parts(
        backend: Arc<dyn PreloadBackend>,
        environment: Environment,
        icon_style: IconStyle,
    ) -> Self {
        Self {
            backend,
            environment,
            icon_style,
            images: Lane::new(AssetKind::Image, "preload"),
            icons: Lane::new(AssetKind::MaterialIcon, "preload_icon"),
            metrics: Arc::new(PreloadMetrics::new()),
        }
    }

    /// Replaces the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Replaces the icon element classes.
    pub fn with_icon_style(mut self, icon_style: IconStyle) -> Self {
        self.icon_style = icon_style;
        self
    }

    /// Ensures the image at `source` is loaded.
    ///
    /// Accepts `&str` or `Option<&str>`; `None` and `""` are rejected with
    /// [`PreloadError::InvalidArgument`].
    pub fn preload<'a>(&self, source: impl Into<Option<&'a str>>) -> Pending<AssetHandle> {
        let surface = self.environment.images().cloned();
        let launch = surface.map(|surface| {
            move |key: &str, completion: Completion<LoadedImage>| {
                surface.load_image(key, completion)
            }
        });

        self.ensure_loaded(
            &self.images,
            source.into(),
            |key| AssetHandle::cached(key.into_string()),
            launch,
            |key, image| {
                let image = Arc::new(image);
                (
                    AssetValue::Image(Arc::clone(&image)),
                    AssetHandle::loaded(key, image),
                )
            },
        )
    }

    /// Ensures the Material icon glyph `icon_name` is loaded.
    ///
    /// Resolves with the icon name.
    pub fn preload_icon<'a>(&self, icon_name: impl Into<Option<&'a str>>) -> Pending<String> {
        let style = self.icon_style.clone();
        let surface = self.environment.glyphs().cloned();
        let launch = surface.map(|surface| {
            move |key: &str, completion: Completion<()>| {
                surface.insert_icon(IconElement::for_icon(&style, key), completion)
            }
        });

        self.ensure_loaded(
            &self.icons,
            icon_name.into(),
            AssetKey::into_string,
            launch,
            |key, ()| (AssetValue::Icon(key.to_string()), key.to_string()),
        )
    }

    /// The backend this preloader records loads in.
    pub fn backend(&self) -> &Arc<dyn PreloadBackend> {
        &self.backend
    }

    /// The surfaces this preloader launches loads on.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Request counters.
    pub fn metrics(&self) -> &PreloadMetrics {
        &self.metrics
    }

    /// Number of unsettled loads of `kind`.
    pub fn in_flight(&self, kind: AssetKind) -> usize {
        match kind {
            AssetKind::Image => self.images.registry.lock().len(),
            AssetKind::MaterialIcon => self.icons.registry.lock().len(),
        }
    }

    /// True if a load of `kind` for `key` has not settled yet.
    pub fn is_in_flight(&self, kind: AssetKind, key: &str) -> bool {
        match kind {
            AssetKind::Image => self.images.registry.lock().contains(key),
            AssetKind::MaterialIcon => self.icons.registry.lock().contains(key),
        }
    }

    fn ensure_loaded<T, V, C, L, F>(
        &self,
        lane: &Lane<T>,
        raw_key: Option<&str>,
        cached: C,
        launch: Option<L>,
        finish: F,
    ) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
        V: Send + 'static,
        C: FnOnce(AssetKey) -> T,
        L: FnOnce(&str, Completion<V>),
        F: FnOnce(&str, V) -> (AssetValue, T) + Send + 'static,
    {
        let kind = lane.kind;
        self.metrics.request();

        let key = match AssetKey::parse(raw_key, kind, lane.operation) {
            Ok(key) => key,
            Err(e) => {
                self.metrics.rejected();
                debug!(kind = %kind, "Rejected preload with empty key");
                return settled(Err(e));
            }
        };

        let mut in_flight = lane.registry.lock();

        if self.backend.contains(key.as_str()) {
            drop(in_flight);
            self.metrics.cache_hit();
            debug!(key = %key, kind = %kind, "Cache hit");
            return settled(Ok(cached(key)));
        }

        if let Some(pending) = in_flight.get(key.as_str()) {
            drop(in_flight);
            self.metrics.joined();
            debug!(key = %key, kind = %kind, "Joined in-flight load");
            return pending;
        }

        let Some(launch) = launch else {
            drop(in_flight);
            return self.unavailable(kind, &key, format!("no {} surface", kind));
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(in_flight);
            return self.unavailable(kind, &key, "no Tokio runtime".to_string());
        };

        let (result_tx, result_rx) = oneshot::channel();
        let cancelled_key = key.as_str().to_string();
        let pending: Pending<T> = async move {
            result_rx.await.unwrap_or_else(|_| {
                Err(PreloadError::UnexpectedFailure {
                    key: cancelled_key,
                    reason: "load cancelled before settling".to_string(),
                })
            })
        }
        .boxed()
        .shared();

        in_flight.insert(key.as_str().to_string(), pending.clone());
        drop(in_flight);

        self.metrics.load_started();
        debug!(key = %key, kind = %kind, "Launching load");

        // Spawned only after the lock is released: a runtime that is shutting
        // down drops the task, and with it the load, on this thread.
        let (completion, receiver) = Completion::channel();
        let load = InFlightLoad {
            kind,
            key: key.as_str().to_string(),
            registry: Arc::clone(&lane.registry),
            backend: Arc::clone(&self.backend),
            metrics: Arc::clone(&self.metrics),
            settled: false,
        };
        runtime.spawn(settle(load, receiver, result_tx, finish));

        // A panicking surface drops the completion while unwinding, which
        // settles the load as an unexpected failure.
        if panic::catch_unwind(AssertUnwindSafe(|| launch(key.as_str(), completion))).is_err() {
            warn!(key = %key, kind = %kind, "Surface panicked while launching load");
        }

        pending
    }

    fn unavailable<T>(&self, kind: AssetKind, key: &AssetKey, reason: String) -> Pending<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.metrics.unavailable();
        warn!(key = %key, kind = %kind, reason = %reason, "Environment unavailable");
        settled(Err(PreloadError::EnvironmentUnavailable { kind, reason }))
    }
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("environment", &self.environment)
            .field("icon_style", &self.icon_style)
            .field("images_in_flight", &self.images.registry.lock().len())
            .field("icons_in_flight", &self.icons.registry.lock().len())
            .finish()
    }
}

/// A pending handle that is already settled.
fn settled<T>(outcome: Result<T, PreloadError>) -> Pending<T>
where
    T: Clone + Send + Sync + 'static,
{
    future::ready(outcome).boxed().shared()
}

/// One registered load, owned by its settle task.
///
/// Settling clears the in-flight entry and records the outcome while holding
/// the registry lock. Dropping it unsettled does the same with a failure, so
/// a torn-down task never leaves its key stuck in the registry.
struct InFlightLoad<T> {
    kind: AssetKind,
    key: String,
    registry: Registry<T>,
    backend: Arc<dyn PreloadBackend>,
    metrics: Arc<PreloadMetrics>,
    settled: bool,
}

impl<T> InFlightLoad<T> {
    fn settle<V, F>(
        mut self,
        outcome: Result<V, SurfaceError>,
        finish: F,
    ) -> Result<T, PreloadError>
    where
        F: FnOnce(&str, V) -> (AssetValue, T),
    {
        self.settled = true;
        let (kind, key) = (self.kind, self.key.as_str());

        let mut in_flight = self.registry.lock();
        in_flight.remove(key);

        match outcome {
            Ok(loaded) => {
                let (value, result) = finish(key, loaded);
                self.backend.set(key, Some(value));
                drop(in_flight);

                self.metrics.load_succeeded();
                info!(key = %key, kind = %kind, "Preloaded");
                Ok(result)
            }
            // The surface could not run here; the key itself did not fail.
            Err(SurfaceError::Unavailable(reason)) => {
                drop(in_flight);

                self.metrics.load_failed();
                warn!(key = %key, kind = %kind, reason = %reason, "Environment unavailable");
                Err(PreloadError::EnvironmentUnavailable { kind, reason })
            }
            Err(e) => {
                self.backend.set(key, None);
                drop(in_flight);

                self.metrics.load_failed();
                warn!(key = %key, kind = %kind, error = %e, "Preload failed");
                Err(PreloadError::from_surface(kind, key, e))
            }
        }
    }
}

impl<T> Drop for InFlightLoad<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut in_flight = self.registry.lock();
        if in_flight.remove(&self.key) {
            self.backend.set(&self.key, None);
        }
        drop(in_flight);

        self.metrics.load_failed();
        warn!(key = %self.key, kind = %self.kind, "Load cancelled before settling");
    }
}

/// Waits for the surface's completion and publishes the settled outcome to
/// every holder of the pending handle.
async fn settle<T, V, F>(
    load: InFlightLoad<T>,
    receiver: CompletionReceiver<V>,
    result_tx: oneshot::Sender<Result<T, PreloadError>>,
    finish: F,
) where
    T: Send + 'static,
    V: Send + 'static,
    F: FnOnce(&str, V) -> (AssetValue, T) + Send + 'static,
{
    let outcome = receiver.await.unwrap_or_else(|_| {
        Err(SurfaceError::Construction(
            "completion dropped without a result".to_string(),
        ))
    });

    // Every handle may have been dropped; the outcome is still recorded.
    let _ = result_tx.send(load.settle(outcome, finish));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::environment::{GlyphSurface, ImageSurface, MemoryDocument};
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Image surface whose loads settle only when the test says so.
    #[derive(Default)]
    struct ManualImages {
        launched: AtomicUsize,
        waiting: Mutex<Vec<(String, Completion<LoadedImage>)>>,
    }

    impl ManualImages {
        fn launches(&self) -> usize {
            self.launched.load(Ordering::SeqCst)
        }

        fn take(&self, source: &str) -> Completion<LoadedImage> {
            let mut waiting = self.waiting.lock();
            let index = waiting
                .iter()
                .position(|(s, _)| s == source)
                .expect("no load waiting for source");
            waiting.remove(index).1
        }

        fn succeed(&self, source: &str) {
            let image = LoadedImage::new(source, DynamicImage::new_rgba8(2, 2));
            self.take(source).loaded(image);
        }

        fn fail(&self, source: &str) {
            self.take(source)
                .failed(SurfaceError::LoadFailed("connection reset".to_string()));
        }

        fn report_unavailable(&self, source: &str) {
            self.take(source)
                .failed(SurfaceError::Unavailable("renderer detached".to_string()));
        }
    }

    impl ImageSurface for ManualImages {
        fn load_image(&self, source: &str, completion: Completion<LoadedImage>) {
            self.launched.fetch_add(1, Ordering::SeqCst);
            self.waiting.lock().push((source.to_string(), completion));
        }
    }

    /// Backend that counts every call.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        contains_calls: AtomicUsize,
        set_calls: AtomicUsize,
    }

    impl CountingBackend {
        fn calls(&self) -> usize {
            self.contains_calls.load(Ordering::SeqCst) + self.set_calls.load(Ordering::SeqCst)
        }
    }

    impl PreloadBackend for CountingBackend {
        fn contains(&self, key: &str) -> bool {
            self.contains_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.contains(key)
        }

        fn set(&self, key: &str, value: Option<AssetValue>) {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value);
        }
    }

    struct PanickingImages;

    impl ImageSurface for PanickingImages {
        fn load_image(&self, _source: &str, _completion: Completion<LoadedImage>) {
            panic!("image element constructor exploded");
        }
    }

    /// Glyph surface that holds inserted elements until the test completes them.
    #[derive(Default)]
    struct DeferredGlyphs {
        waiting: Mutex<Vec<(IconElement, Completion<()>)>>,
    }

    impl DeferredGlyphs {
        fn inserted(&self) -> usize {
            self.waiting.lock().len()
        }

        fn complete_all(&self) {
            for (_, completion) in self.waiting.lock().drain(..) {
                completion.loaded(());
            }
        }
    }

    impl GlyphSurface for DeferredGlyphs {
        fn insert_icon(&self, element: IconElement, completion: Completion<()>) {
            self.waiting.lock().push((element, completion));
        }
    }

    fn manual_preloader() -> (Preloader, Arc<ManualImages>, Arc<MemoryBackend>) {
        let images = Arc::new(ManualImages::default());
        let backend = Arc::new(MemoryBackend::new());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_images(images.clone()));
        (preloader, images, backend)
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_load() {
        let (preloader, images, backend) = manual_preloader();

        let first = preloader.preload("a.png");
        let second = preloader.preload("a.png");
        let third = preloader.preload("a.png");

        assert_eq!(images.launches(), 1);
        assert!(first.ptr_eq(&second));
        assert!(first.ptr_eq(&third));
        assert_eq!(preloader.in_flight(AssetKind::Image), 1);

        images.succeed("a.png");

        let (a, b, c) = tokio::join!(first, second, third);
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(Arc::ptr_eq(a.image().unwrap(), b.image().unwrap()));
        assert!(Arc::ptr_eq(a.image().unwrap(), c.image().unwrap()));
        assert!(backend.contains("a.png"));
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_launch() {
        let (preloader, images, backend) = manual_preloader();
        backend.set("x", Some(AssetValue::Icon("x".to_string())));

        let handle = preloader.preload("x").await.unwrap();

        assert!(handle.is_cache_hit());
        assert_eq!(handle.key(), "x");
        assert_eq!(images.launches(), 0);
        assert!(!preloader.is_in_flight(AssetKind::Image, "x"));
    }

    #[tokio::test]
    async fn test_loaded_key_is_idempotent() {
        let (preloader, images, _backend) = manual_preloader();

        let pending = preloader.preload("a.png");
        images.succeed("a.png");
        let first = pending.await.unwrap();
        assert!(!first.is_cache_hit());

        for _ in 0..3 {
            let again = preloader.preload("a.png").await.unwrap();
            assert!(again.is_cache_hit());
            assert_eq!(again.key(), "a.png");
        }
        assert_eq!(images.launches(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_sticky() {
        let (preloader, images, backend) = manual_preloader();

        let pending = preloader.preload("flaky.png");
        images.fail("flaky.png");
        let err = pending.await.unwrap_err();

        assert!(err.is_load_failure());
        assert!(!backend.contains("flaky.png"));
        assert_eq!(backend.len(), 1);
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);

        let retry = preloader.preload("flaky.png");
        assert_eq!(images.launches(), 2);
        images.succeed("flaky.png");
        assert!(retry.await.is_ok());
        assert!(backend.contains("flaky.png"));
    }

    #[tokio::test]
    async fn test_all_joiners_receive_the_failure() {
        let (preloader, images, _backend) = manual_preloader();

        let first = preloader.preload("a.png");
        let second = preloader.preload("a.png");
        images.fail("a.png");

        assert_eq!(first.await.unwrap_err(), second.await.unwrap_err());
    }

    #[tokio::test]
    async fn test_empty_key_never_touches_backend() {
        let backend = Arc::new(CountingBackend::default());
        let images = Arc::new(ManualImages::default());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_images(images.clone()));

        let err = preloader.preload("").await.unwrap_err();
        assert!(matches!(err, PreloadError::InvalidArgument { operation: "preload", .. }));

        let err = preloader.preload(None).await.unwrap_err();
        assert!(matches!(err, PreloadError::InvalidArgument { .. }));

        let err = preloader.preload_icon("").await.unwrap_err();
        assert!(matches!(err, PreloadError::InvalidArgument { operation: "preload_icon", .. }));

        assert_eq!(backend.calls(), 0);
        assert_eq!(images.launches(), 0);
        assert_eq!(preloader.metrics().snapshot().rejected, 3);
    }

    #[tokio::test]
    async fn test_missing_surface_leaves_state_untouched() {
        let backend = Arc::new(CountingBackend::default());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless());

        let err = preloader.preload_icon("home").await.unwrap_err();

        assert!(matches!(
            err,
            PreloadError::EnvironmentUnavailable { kind: AssetKind::MaterialIcon, .. }
        ));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 0);
        assert_eq!(preloader.in_flight(AssetKind::MaterialIcon), 0);
    }

    #[test]
    fn test_missing_runtime_is_unavailable() {
        let (preloader, images, backend) = manual_preloader();

        let outcome = futures::executor::block_on(preloader.preload("a.png"));

        assert!(matches!(outcome, Err(PreloadError::EnvironmentUnavailable { .. })));
        assert_eq!(images.launches(), 0);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_icon_preload_inserts_hidden_element() {
        let document = Arc::new(MemoryDocument::new());
        let backend = Arc::new(MemoryBackend::new());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_glyphs(document.clone()));

        let name = preloader.preload_icon("favorite").await.unwrap();

        assert_eq!(name, "favorite");
        assert!(backend.contains("favorite"));
        let elements = document.elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].class, "material-icons karl-favorite bg-transparent");
        assert_eq!(elements[0].content, "favorite");

        // Second request is a hit and inserts nothing new.
        assert_eq!(preloader.preload_icon("favorite").await.unwrap(), "favorite");
        assert_eq!(document.len(), 1);
    }

    #[tokio::test]
    async fn test_icon_style_is_applied() {
        let document = Arc::new(MemoryDocument::new());
        let preloader = Preloader::with_backend(Arc::new(MemoryBackend::new()))
            .with_environment(Environment::headless().with_glyphs(document.clone()))
            .with_icon_style(IconStyle {
                icon_class: "material-symbols".into(),
                marker_prefix: "app".into(),
                extra_classes: String::new(),
            });

        preloader.preload_icon("home").await.unwrap();
        assert_eq!(document.elements()[0].class, "material-symbols app-home");
    }

    #[tokio::test]
    async fn test_element_construction_failure_is_unexpected() {
        let backend = Arc::new(MemoryBackend::new());
        let preloader = Preloader::with_backend(backend.clone()).with_environment(
            Environment::headless().with_glyphs(Arc::new(MemoryDocument::without_body())),
        );

        let err = preloader.preload_icon("home").await.unwrap_err();

        assert!(matches!(err, PreloadError::UnexpectedFailure { .. }));
        assert!(!backend.contains("home"));
        assert_eq!(preloader.in_flight(AssetKind::MaterialIcon), 0);
    }

    #[tokio::test]
    async fn test_panicking_surface_is_contained() {
        let backend = Arc::new(MemoryBackend::new());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_images(Arc::new(PanickingImages)));

        let err = preloader.preload("boom.png").await.unwrap_err();
        assert!(matches!(err, PreloadError::UnexpectedFailure { .. }));

        // Still usable afterwards.
        let err = preloader.preload("boom.png").await.unwrap_err();
        assert!(matches!(err, PreloadError::UnexpectedFailure { .. }));
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);
    }

    #[tokio::test]
    async fn test_dropped_interest_does_not_stop_load() {
        let (preloader, images, backend) = manual_preloader();

        drop(preloader.preload("a.png"));
        images.succeed("a.png");

        for _ in 0..100 {
            if backend.contains("a.png") {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(backend.contains("a.png"));
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);
    }

    #[tokio::test]
    async fn test_unsettled_load_stays_pending() {
        let (preloader, images, _backend) = manual_preloader();

        let pending = preloader.preload("slow.png");
        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(20), pending.clone()).await;

        assert!(outcome.is_err());
        assert!(preloader.is_in_flight(AssetKind::Image, "slow.png"));
        assert!(preloader.preload("slow.png").ptr_eq(&pending));
        assert_eq!(images.launches(), 1);
    }

    #[tokio::test]
    async fn test_image_and_icon_registries_are_separate() {
        let images = Arc::new(ManualImages::default());
        let document = Arc::new(MemoryDocument::new());
        let preloader = Preloader::with_backend(Arc::new(MemoryBackend::new())).with_environment(
            Environment::headless()
                .with_images(images.clone())
                .with_glyphs(document.clone()),
        );

        let image = preloader.preload("home");
        let icon = preloader.preload_icon("home").await.unwrap();

        assert_eq!(icon, "home");
        assert_eq!(images.launches(), 1);
        images.succeed("home");
        assert!(image.await.is_ok());
    }

    #[tokio::test]
    async fn test_metrics_track_each_path() {
        let (preloader, images, _backend) = manual_preloader();

        let first = preloader.preload("a.png");
        let _joined = preloader.preload("a.png");
        images.succeed("a.png");
        first.await.unwrap();
        preloader.preload("a.png").await.unwrap();
        let _ = preloader.preload("").await;

        let snapshot = preloader.metrics().snapshot();
        assert_eq!(snapshot.requests, 4);
        assert_eq!(snapshot.loads_started, 1);
        assert_eq!(snapshot.joined, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.loads_succeeded, 1);
        assert_eq!(snapshot.rejected, 1);
    }

    #[tokio::test]
    async fn test_icon_requests_join_pending_insertion() {
        let glyphs = Arc::new(DeferredGlyphs::default());
        let backend = Arc::new(MemoryBackend::new());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_glyphs(glyphs.clone()));

        let first = preloader.preload_icon("favorite");
        let second = preloader.preload_icon("favorite");

        assert!(first.ptr_eq(&second));
        assert_eq!(glyphs.inserted(), 1);
        assert!(preloader.is_in_flight(AssetKind::MaterialIcon, "favorite"));
        assert!(!backend.contains("favorite"));

        glyphs.complete_all();

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.unwrap(), "favorite");
        assert_eq!(b.unwrap(), "favorite");
        assert!(backend.contains("favorite"));
        assert_eq!(preloader.in_flight(AssetKind::MaterialIcon), 0);
        assert_eq!(preloader.metrics().snapshot().joined, 1);
    }

    #[tokio::test]
    async fn test_late_unavailable_report_leaves_backend_untouched() {
        let backend = Arc::new(CountingBackend::default());
        let images = Arc::new(ManualImages::default());
        let preloader = Preloader::with_backend(backend.clone())
            .with_environment(Environment::headless().with_images(images.clone()));

        let pending = preloader.preload("a.png");
        images.report_unavailable("a.png");
        let err = pending.await.unwrap_err();

        assert!(matches!(err, PreloadError::EnvironmentUnavailable { kind: AssetKind::Image, .. }));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 0);
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);
    }

    #[test]
    fn test_runtime_shutdown_mid_load_allows_retry() {
        let (preloader, images, backend) = manual_preloader();

        let first_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let abandoned = first_runtime.block_on(async { preloader.preload("a.png") });
        assert!(preloader.is_in_flight(AssetKind::Image, "a.png"));

        // Tears down the settle task while the element is still loading.
        drop(first_runtime);

        assert!(!preloader.is_in_flight(AssetKind::Image, "a.png"));
        assert!(!backend.contains("a.png"));
        // The first element's completion no longer has a listener.
        drop(images.take("a.png"));

        let second_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        second_runtime.block_on(async {
            let err = abandoned.clone().await.unwrap_err();
            assert!(matches!(err, PreloadError::UnexpectedFailure { ref key, .. } if key == "a.png"));

            let retry = preloader.preload("a.png");
            assert!(!retry.ptr_eq(&abandoned));
            assert_eq!(images.launches(), 2);

            images.succeed("a.png");
            assert!(retry.await.is_ok());
        });

        assert!(backend.contains("a.png"));
        assert_eq!(preloader.metrics().snapshot().loads_failed, 1);
        assert_eq!(preloader.in_flight(AssetKind::Image), 0);
    }
}
