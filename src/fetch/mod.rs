//! Speculative page fetching: the HTTP client and the single-flight
//! coordinator.
//!
//! The split mirrors the decision/transport boundary: [`FetchCoordinator`]
//! decides whether a fetch happens and owns the one in-flight slot;
//! [`PageFetcher`] is how the bytes actually move, with [`PageClient`] as
//! the production implementation over `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use nav_prefetch::PageClient;
//! use nav_prefetch::{PageFetcher, RouteId};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PageClient::new(Url::parse("https://app.example.com")?);
//! let html = client.fetch(&RouteId::new("/leads")).await?;
//! println!("fetched {} bytes", html.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod coordinator;
mod error;

pub use client::PageClient;
pub use coordinator::FetchCoordinator;
pub use error::FetchError;

use async_trait::async_trait;

use crate::route::RouteId;

/// Transport for fetching a page body by route.
///
/// Implementations must issue same-origin requests marked as programmatic
/// (not full navigations) and must be cancellation-safe: the coordinator
/// drops the returned future when a fetch is superseded.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Arc<dyn PageFetcher>`. Rust 2024 native async traits are not
/// object-safe, so `async_trait` is required for the pluggable-transport
/// pattern.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page body for `route`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the route cannot be resolved, the
    /// request fails at the network level, or the server responds with a
    /// non-success status.
    async fn fetch(&self, route: &RouteId) -> Result<String, FetchError>;
}
