//! Engine configuration and validation errors.
//!
//! [`PrefetchConfig`] carries everything an embedder decides up front: the
//! page origin, the allow-listed routes, and the three timing windows. It
//! derives serde so applications can load it from their own config files.
//! Validation happens at engine construction, not here — see
//! [`PrefetchEngine::new`](crate::engine::PrefetchEngine::new).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_DEBOUNCE, DEFAULT_IDLE_WINDOW};

/// Configuration for a prefetch engine instance.
///
/// # Example
///
/// ```
/// use nav_prefetch::PrefetchConfig;
///
/// let config = PrefetchConfig::new(
///     "https://app.example.com",
///     ["/", "/leads", "/clients", "/tasks", "/notes"],
/// );
/// assert_eq!(config.routes.len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Origin all prefetches resolve against, e.g. `https://app.example.com`.
    /// Any path, query, or fragment on it is ignored.
    pub origin: String,

    /// Allow-listed navigation routes. Only these paths are ever fetched
    /// speculatively; keep side-effecting routes (logout, form posts) out.
    pub routes: Vec<String>,

    /// How long a hover must last before the prefetch fires.
    #[serde(default = "default_debounce")]
    pub debounce: Duration,

    /// Freshness window for cached page content.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: Duration,

    /// Trailing window in which the user counts as recently active.
    /// Prefetching is only permitted while an interaction happened within it.
    #[serde(default = "default_idle_window")]
    pub idle_window: Duration,
}

fn default_debounce() -> Duration {
    DEFAULT_DEBOUNCE
}

fn default_cache_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

fn default_idle_window() -> Duration {
    DEFAULT_IDLE_WINDOW
}

impl PrefetchConfig {
    /// Creates a config with the default timing windows.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        routes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            origin: origin.into(),
            routes: routes.into_iter().map(Into::into).collect(),
            debounce: DEFAULT_DEBOUNCE,
            cache_ttl: DEFAULT_CACHE_TTL,
            idle_window: DEFAULT_IDLE_WINDOW,
        }
    }
}

/// Errors raised when an engine is constructed from an invalid config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured origin is not a usable http(s) base URL.
    #[error("invalid origin {origin}: {reason}")]
    InvalidOrigin {
        /// The origin string that was rejected.
        origin: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The route allow-list is empty, so nothing could ever be prefetched.
    #[error("route allow-list is empty")]
    NoRoutes,

    /// An allow-listed route does not resolve within the configured origin.
    #[error("route {route} does not resolve within the configured origin")]
    ForeignRoute {
        /// The offending route entry.
        route: String,
    },

    /// A timing window was configured as zero.
    #[error("{setting} must be greater than zero")]
    ZeroDuration {
        /// Name of the zero-valued setting.
        setting: &'static str,
    },
}

impl ConfigError {
    /// Creates an invalid-origin error.
    pub fn invalid_origin(origin: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            reason,
        }
    }

    /// Creates a foreign-route error.
    pub fn foreign_route(route: impl Into<String>) -> Self {
        Self::ForeignRoute {
            route: route.into(),
        }
    }

    /// Creates a zero-duration error.
    pub fn zero_duration(setting: &'static str) -> Self {
        Self::ZeroDuration { setting }
    }
}
