//! Speculative Navigation Prefetch
//!
//! This library prefetches the pages a user is about to visit. Sustained
//! hovers over in-app links are treated as navigation intent: after a
//! debounce window the target page is fetched over HTTP and parked in a
//! short-lived cache, so the page-transition path can swap content in
//! without a network round trip.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`route`] - Origin boundary and route identity rules
//! - [`gate`] - Network-condition and user-activity gating
//! - [`cache`] - TTL cache for prefetched page content
//! - [`fetch`] - HTTP fetching and single-flight coordination
//! - [`intent`] - Hover-intent detection with debounce
//! - [`bridge`] - Cache hand-off to the page-transition path
//! - [`engine`] - Facade wiring the subsystems together
//!
//! Embedders normally construct a [`PrefetchEngine`] and forward pointer
//! and interaction events to it; everything else is plumbing.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod cache;
pub mod config;
pub mod constants;
pub mod engine;
pub mod fetch;
pub mod gate;
pub mod intent;
pub mod route;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use bridge::{CacheBridge, PageResolver, ResolvedPage};
pub use cache::PrefetchCache;
pub use config::{ConfigError, PrefetchConfig};
pub use constants::{DEFAULT_CACHE_TTL, DEFAULT_DEBOUNCE, DEFAULT_IDLE_WINDOW};
pub use engine::PrefetchEngine;
pub use fetch::{FetchCoordinator, FetchError, PageClient, PageFetcher};
pub use gate::{
    ConnectionInfo, EffectiveType, FixedConnection, InteractionClock, NetworkMonitor,
    NoConnectionInfo, PrefetchGate,
};
pub use intent::IntentDetector;
pub use route::{RouteId, RoutePolicy};
