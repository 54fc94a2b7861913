//! HTTP client for fetching pages into the prefetch cache.
//!
//! This is the production [`PageFetcher`]: a thin wrapper over a pooled
//! `reqwest` client that issues same-origin GET requests marked with the
//! `X-Requested-With: XMLHttpRequest` header so servers can tell a
//! background prefetch from a full navigation.
//!
//! The client deliberately sets **no request timeouts**. A speculative
//! fetch is bounded by supersession (a newer hover cancels it) and by
//! engine shutdown, not by a deadline.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use super::PageFetcher;
use crate::constants::{REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
use crate::route::RouteId;

/// HTTP client for same-origin page fetches.
///
/// Created once per engine and reused for every prefetch, taking advantage
/// of connection pooling. Gzip decompression is enabled; redirects follow
/// reqwest's default policy.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
    origin: Url,
}

impl PageClient {
    /// Creates a client fetching against the given origin.
    ///
    /// Requests carry no cookies; use
    /// [`with_cookie_jar`](Self::with_cookie_jar) when prefetched pages are
    /// session-gated.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(origin: Url) -> Self {
        let client = Client::builder()
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, origin }
    }

    /// Creates a client with a cookie jar for session-gated pages.
    ///
    /// Cookies in the jar are automatically attached to matching requests,
    /// so the prefetched content is what the signed-in user would see.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    #[instrument(level = "debug", skip(cookie_jar))]
    pub fn with_cookie_jar(origin: Url, cookie_jar: Arc<Jar>) -> Self {
        let client = Client::builder()
            .gzip(true)
            .cookie_provider(cookie_jar)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, origin }
    }

    /// Returns the origin requests resolve against.
    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Returns a reference to the underlying reqwest client.
    ///
    /// This can be used for advanced operations not covered by this wrapper.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for PageClient {
    #[instrument(level = "debug", skip(self), fields(route = %route))]
    async fn fetch(&self, route: &RouteId) -> Result<String, FetchError> {
        let url = self
            .origin
            .join(route.as_str())
            .map_err(|_| FetchError::invalid_route(route.as_str()))?;

        debug!(url = %url, "requesting page");

        let response = self
            .client
            .get(url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))
    }
}
