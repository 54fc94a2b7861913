//! TTL cache for prefetched page content.
//!
//! Entries are stamped at insert and considered valid while
//! `now - created_at <= ttl`. Nothing sweeps the map in the background:
//! staleness is discovered and purged on read, which bounds memory by read
//! pressure over a small allow-listed route set.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::route::RouteId;

/// Keyed store mapping a route identity to fetched content plus an expiry
/// clock.
///
/// Shared by reference between the fetch path (writes), the cache bridge
/// (reads), and the engine's control surface (clear/len). The inner map is
/// behind a std mutex; no lock is ever held across an await.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use nav_prefetch::{PrefetchCache, RouteId};
///
/// # async fn example() {
/// let cache = PrefetchCache::new(Duration::from_secs(60));
/// cache.put(RouteId::new("/leads"), "<html>leads</html>".to_string());
/// assert_eq!(cache.get(&RouteId::new("/leads")).as_deref(), Some("<html>leads</html>"));
/// # }
/// ```
#[derive(Debug)]
pub struct PrefetchCache {
    ttl: Duration,
    entries: Mutex<HashMap<RouteId, CacheEntry>>,
}

#[derive(Debug)]
struct CacheEntry {
    content: String,
    created_at: Instant,
}

impl PrefetchCache {
    /// Creates an empty cache with the given freshness window.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the content for `route` if a fresh entry exists.
    ///
    /// A stale entry is removed on the way out and reported as a miss; this
    /// is the only place expiry happens.
    #[must_use]
    pub fn get(&self, route: &RouteId) -> Option<String> {
        let mut entries = self.lock_entries();
        let expired = match entries.get(route) {
            Some(entry) => {
                if entry.created_at.elapsed() <= self.ttl {
                    return Some(entry.content.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            entries.remove(route);
            debug!(route = %route, "expired entry removed");
        }
        None
    }

    /// Inserts or overwrites the entry for `route`, stamped now.
    pub fn put(&self, route: RouteId, content: String) {
        let mut entries = self.lock_entries();
        entries.insert(
            route,
            CacheEntry {
                content,
                created_at: Instant::now(),
            },
        );
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Returns the number of stored entries, *without* expiry filtering.
    ///
    /// Stale entries that no read has purged yet are counted. This is a
    /// diagnostic signal, not a freshness guarantee.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Returns true when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured freshness window.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<RouteId, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
