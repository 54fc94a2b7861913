//! Engine facade wiring the prefetch subsystems together.
//!
//! [`PrefetchEngine`] owns the route policy, gate, cache, coordinator, and
//! intent detector and exposes the small surface an embedder drives from
//! its event handlers: hover enter/leave, interaction pings, cache
//! inspection, and shutdown. The engine is cheap to clone; all clones
//! share one set of subsystems.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::cookie::Jar;
use tracing::{debug, info};

use crate::bridge::{CacheBridge, PageResolver};
use crate::cache::PrefetchCache;
use crate::config::{ConfigError, PrefetchConfig};
use crate::fetch::{FetchCoordinator, PageClient, PageFetcher};
use crate::gate::{InteractionClock, NetworkMonitor, NoConnectionInfo, PrefetchGate};
use crate::intent::IntentDetector;
use crate::route::RoutePolicy;

/// Speculative prefetch engine for client-side navigation.
///
/// Construction validates the configuration and wires the subsystems; the
/// embedder then forwards pointer and interaction events and, at teardown,
/// calls [`shutdown`](Self::shutdown). After shutdown the event intake
/// goes quiet but cache reads keep working, so an in-progress navigation
/// can still be served.
///
/// # Example
///
/// ```
/// use nav_prefetch::{PrefetchConfig, PrefetchEngine};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PrefetchConfig::new(
///     "https://app.example.com",
///     ["/", "/leads", "/clients", "/tasks", "/notes"],
/// );
/// let engine = PrefetchEngine::with_defaults(&config)?;
///
/// engine.record_interaction();
/// engine.hover_enter("/leads");
/// // ... pointer wanders off ...
/// engine.hover_leave();
///
/// engine.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrefetchEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    cache: Arc<PrefetchCache>,
    policy: Arc<RoutePolicy>,
    clock: Arc<InteractionClock>,
    detector: IntentDetector,
    coordinator: Arc<FetchCoordinator>,
    active: AtomicBool,
}

impl PrefetchEngine {
    /// Creates an engine with the given fetcher and network monitor.
    ///
    /// This is the fully pluggable constructor; most embedders want
    /// [`with_defaults`](Self::with_defaults) or
    /// [`with_cookie_jar`](Self::with_cookie_jar) instead.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the origin does not parse as an
    /// http(s) URL, the route list is empty or leaves the origin, or any
    /// timing window is zero.
    pub fn new(
        config: &PrefetchConfig,
        fetcher: Arc<dyn PageFetcher>,
        monitor: Arc<dyn NetworkMonitor>,
    ) -> Result<Self, ConfigError> {
        let policy = RoutePolicy::from_config(config)?;
        Self::from_parts(config, policy, fetcher, monitor)
    }

    /// Creates an engine with a plain HTTP fetcher and no network monitor.
    ///
    /// Without a monitor the network gate is fail-open and only the idle
    /// window can block prefetching.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid; see
    /// [`new`](Self::new).
    pub fn with_defaults(config: &PrefetchConfig) -> Result<Self, ConfigError> {
        let policy = RoutePolicy::from_config(config)?;
        let fetcher = Arc::new(PageClient::new(policy.origin().clone()));
        Self::from_parts(config, policy, fetcher, Arc::new(NoConnectionInfo))
    }

    /// Creates an engine whose fetcher shares the given cookie jar.
    ///
    /// Use this when prefetched routes sit behind a session so the cached
    /// content matches what the signed-in user would see. Embedders that
    /// need both a cookie jar and a network monitor should build a
    /// [`PageClient`] themselves and call [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid; see
    /// [`new`](Self::new).
    pub fn with_cookie_jar(
        config: &PrefetchConfig,
        cookie_jar: Arc<Jar>,
    ) -> Result<Self, ConfigError> {
        let policy = RoutePolicy::from_config(config)?;
        let fetcher = Arc::new(PageClient::with_cookie_jar(
            policy.origin().clone(),
            cookie_jar,
        ));
        Self::from_parts(config, policy, fetcher, Arc::new(NoConnectionInfo))
    }

    fn from_parts(
        config: &PrefetchConfig,
        policy: RoutePolicy,
        fetcher: Arc<dyn PageFetcher>,
        monitor: Arc<dyn NetworkMonitor>,
    ) -> Result<Self, ConfigError> {
        if config.debounce.is_zero() {
            return Err(ConfigError::zero_duration("debounce"));
        }
        if config.cache_ttl.is_zero() {
            return Err(ConfigError::zero_duration("cache_ttl"));
        }
        if config.idle_window.is_zero() {
            return Err(ConfigError::zero_duration("idle_window"));
        }

        let policy = Arc::new(policy);
        let clock = Arc::new(InteractionClock::new());
        let gate = Arc::new(PrefetchGate::new(
            monitor,
            Arc::clone(&clock),
            config.idle_window,
        ));
        let cache = Arc::new(PrefetchCache::new(config.cache_ttl));
        let coordinator = Arc::new(FetchCoordinator::new(
            fetcher,
            Arc::clone(&cache),
            Arc::clone(&gate),
        ));
        let detector = IntentDetector::new(
            Arc::clone(&policy),
            gate,
            Arc::clone(&coordinator),
            config.debounce,
        );

        info!(
            origin = %policy.origin(),
            routes = policy.route_count(),
            debounce_ms = config.debounce.as_millis(),
            ttl_ms = config.cache_ttl.as_millis(),
            idle_window_ms = config.idle_window.as_millis(),
            "prefetch engine ready"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                cache,
                policy,
                clock,
                detector,
                coordinator,
                active: AtomicBool::new(true),
            }),
        })
    }

    /// Reports the pointer entering a link with the given `href`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the debounce timer
    /// runs as a spawned task.
    pub fn hover_enter(&self, href: &str) {
        if !self.is_active() {
            return;
        }
        self.inner.detector.hover_enter(href);
    }

    /// Reports the pointer leaving the hovered link.
    pub fn hover_leave(&self) {
        if !self.is_active() {
            return;
        }
        self.inner.detector.hover_leave();
    }

    /// Records a user interaction, restarting the idle window.
    ///
    /// Wire this to coarse activity events (pointer movement, key presses,
    /// scrolling). Without periodic calls the engine stops prefetching
    /// once the idle window elapses.
    pub fn record_interaction(&self) {
        if !self.is_active() {
            return;
        }
        self.inner.clock.touch();
    }

    /// Builds a [`CacheBridge`] over this engine's cache.
    ///
    /// The returned resolver serves navigations from prefetched content
    /// when possible and delegates to `fallback` otherwise.
    #[must_use]
    pub fn page_resolver(&self, fallback: Arc<dyn PageResolver>) -> CacheBridge {
        CacheBridge::new(
            Arc::clone(&self.inner.cache),
            Arc::clone(&self.inner.policy),
            fallback,
        )
    }

    /// Drops all cached pages.
    ///
    /// Call after mutations that invalidate previously fetched content,
    /// such as a submitted form or a logout.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Returns the number of cache entries, fresh or not.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.inner.cache.len()
    }

    /// Returns whether the engine is still accepting events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Stops the engine.
    ///
    /// Cancels the armed hover timer and the in-flight fetch and turns
    /// the event intake into a no-op. Idempotent; later calls do nothing.
    /// Cached content stays readable through an existing bridge.
    pub fn shutdown(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            debug!("shutting down prefetch engine");
            self.inner.detector.hover_leave();
            self.inner.coordinator.abort();
        }
    }
}

impl std::fmt::Debug for PrefetchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchEngine")
            .field("active", &self.is_active())
            .field("cached_routes", &self.cache_size())
            .finish_non_exhaustive()
    }
}
