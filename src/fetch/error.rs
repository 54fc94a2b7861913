//! Error types for speculative page fetches.
//!
//! None of these ever surface to a user: a failed speculative fetch is
//! logged at debug level and dropped, and the eventual real navigation
//! performs its own request. The structured variants exist for diagnostics
//! and for [`PageResolver`](crate::bridge::PageResolver) implementations
//! that do propagate their own fetch failures.

use thiserror::Error;

/// Errors that can occur while fetching a page for the prefetch cache.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors,
    /// etc.)
    #[error("network error prefetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} prefetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The route could not be resolved against the configured origin.
    #[error("invalid route {route}: cannot resolve against the configured origin")]
    InvalidRoute {
        /// The route that failed to resolve.
        route: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid-route error.
    pub fn invalid_route(route: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` because the
// variants require context (the URL being fetched) that the source error
// doesn't carry. The helper constructors are the pattern callers use.
