//! Single-flight coordination of speculative fetches.
//!
//! At most one prefetch runs at a time. A request for the route already in
//! flight is a no-op; a request for a different route aborts the running
//! fetch and starts the new one. Completed fetches land in the cache only
//! if they have not been superseded in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;
use tracing::{debug, instrument};

use super::PageFetcher;
use crate::cache::PrefetchCache;
use crate::gate::PrefetchGate;
use crate::route::RouteId;

/// Bookkeeping for the one fetch currently running.
#[derive(Debug)]
struct InFlight {
    route: RouteId,
    generation: u64,
    abort: AbortHandle,
}

/// Serializes speculative fetches and settles their results into the cache.
///
/// The coordinator owns the in-flight slot. [`request`](Self::request)
/// checks the gate and the cache before spawning; the spawned task writes
/// back through the coordinator so a superseded fetch can never clobber
/// the slot or the cache.
pub struct FetchCoordinator {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<PrefetchCache>,
    gate: Arc<PrefetchGate>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    generation: Arc<AtomicU64>,
}

impl FetchCoordinator {
    /// Creates a coordinator over the given fetcher, cache, and gate.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<PrefetchCache>,
        gate: Arc<PrefetchGate>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            gate,
            in_flight: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Requests a speculative fetch for the given route.
    ///
    /// Returns without fetching when the gate denies, the cache already
    /// holds a fresh copy, or the same route is already being fetched.
    /// A different in-flight route is aborted and replaced.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the fetch runs as a
    /// spawned task.
    #[instrument(level = "debug", skip(self), fields(route = %route))]
    pub fn request(&self, route: RouteId) {
        if !self.gate.permits() {
            return;
        }

        if self.cache.get(&route).is_some() {
            debug!("cache entry still fresh, skipping prefetch");
            return;
        }

        let mut slot = Self::lock_slot(&self.in_flight);
        if let Some(active) = slot.as_ref() {
            if active.route == route {
                debug!("request already in flight");
                return;
            }
            debug!(current = %active.route, "cancelling superseded prefetch");
            active.abort.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let task = tokio::spawn(run_fetch(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.cache),
            Arc::clone(&self.in_flight),
            route.clone(),
            generation,
        ));
        *slot = Some(InFlight {
            route,
            generation,
            abort: task.abort_handle(),
        });
    }

    /// Aborts the in-flight fetch, if any.
    ///
    /// Used during engine shutdown. The aborted task never reaches its
    /// write-back, so the cache is untouched.
    pub fn abort(&self) {
        let mut slot = Self::lock_slot(&self.in_flight);
        if let Some(active) = slot.take() {
            debug!(route = %active.route, "aborting in-flight prefetch");
            active.abort.abort();
        }
    }

    /// Returns the route currently being fetched, if any.
    #[must_use]
    pub fn in_flight_route(&self) -> Option<RouteId> {
        Self::lock_slot(&self.in_flight)
            .as_ref()
            .map(|active| active.route.clone())
    }

    fn lock_slot(
        in_flight: &Mutex<Option<InFlight>>,
    ) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Runs one fetch to completion and settles the result.
///
/// The slot is cleared and the cache written only while this task still
/// owns the current generation. A task aborted mid-fetch never reaches
/// this point; a task that lost the slot to a newer request discards its
/// result.
async fn run_fetch(
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<PrefetchCache>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    route: RouteId,
    generation: u64,
) {
    let outcome = fetcher.fetch(&route).await;

    let mut slot = FetchCoordinator::lock_slot(&in_flight);
    let owns_slot = slot
        .as_ref()
        .is_some_and(|active| active.generation == generation);
    if !owns_slot {
        debug!(route = %route, "discarding superseded prefetch result");
        return;
    }
    *slot = None;
    match outcome {
        Ok(content) => {
            debug!(route = %route, bytes = content.len(), "prefetch complete");
            cache.put(route, content);
        }
        Err(error) => {
            debug!(route = %route, error = %error, "prefetch failed");
        }
    }
}
