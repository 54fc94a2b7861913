//! Cache hand-off for the page transition path.
//!
//! When a navigation actually happens, the transition mechanism asks a
//! [`PageResolver`] for the target page. [`CacheBridge`] answers from the
//! prefetch cache when it can and falls back to the embedder's resolver
//! (typically a live fetch) when it cannot. Navigation is never broken by
//! the bridge: a cold or expired cache just means the fallback does the
//! work it would have done anyway.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cache::PrefetchCache;
use crate::fetch::FetchError;
use crate::route::RoutePolicy;

/// A page ready to be swapped into the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPage {
    /// The navigation target as originally requested.
    pub url: String,
    /// The page markup.
    pub html: String,
}

impl ResolvedPage {
    /// Creates a resolved page from a target and its markup.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Resolves a navigation target to its page content.
///
/// Implemented by the embedder's transition mechanism (usually a live
/// fetch) and by [`CacheBridge`], which wraps such a resolver with a
/// cache lookup.
///
/// # Object Safety
///
/// Declared with `async_trait` so it can be stored as a trait object
/// (Rust 2024 native async traits are not object-safe).
#[async_trait]
pub trait PageResolver: Send + Sync {
    /// Resolves `target` to a page, fetching it if necessary.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the page cannot be produced.
    async fn resolve(&self, target: &str) -> Result<ResolvedPage, FetchError>;
}

/// A [`PageResolver`] that consults the prefetch cache first.
///
/// Cache keys are derived with the same normalization as the prefetch
/// path, so a hover on `/leads?page=2` and a navigation to `/leads` meet
/// at the same entry. Lookup uses the identity rule alone: content cached
/// for a route stays servable even if the prefetchable set changes.
pub struct CacheBridge {
    cache: Arc<PrefetchCache>,
    policy: Arc<RoutePolicy>,
    fallback: Arc<dyn PageResolver>,
}

impl CacheBridge {
    /// Creates a bridge over the given cache and fallback resolver.
    #[must_use]
    pub fn new(
        cache: Arc<PrefetchCache>,
        policy: Arc<RoutePolicy>,
        fallback: Arc<dyn PageResolver>,
    ) -> Self {
        Self {
            cache,
            policy,
            fallback,
        }
    }
}

#[async_trait]
impl PageResolver for CacheBridge {
    #[instrument(level = "debug", skip(self), fields(target = %target))]
    async fn resolve(&self, target: &str) -> Result<ResolvedPage, FetchError> {
        if let Some(route) = self.policy.identity(target) {
            if let Some(html) = self.cache.get(&route) {
                debug!(route = %route, "serving prefetched content");
                return Ok(ResolvedPage::new(target, html));
            }
        }
        self.fallback.resolve(target).await
    }
}

impl std::fmt::Debug for CacheBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBridge")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
