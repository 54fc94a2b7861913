//! Hover-intent detection with a debounce window.
//!
//! A hover only signals navigation intent if it lasts. Each eligible hover
//! arms a timer; if the pointer leaves before the timer fires the hover is
//! forgotten, and only a hover that survives the full debounce window
//! reaches the fetch coordinator. A new hover always replaces the armed
//! one, so at most one timer is pending at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, instrument};

use crate::fetch::FetchCoordinator;
use crate::gate::PrefetchGate;
use crate::route::{RouteId, RoutePolicy};

/// Bookkeeping for the one armed debounce timer.
#[derive(Debug)]
struct PendingIntent {
    route: RouteId,
    generation: u64,
    abort: AbortHandle,
}

/// Turns raw hover events into debounced prefetch requests.
///
/// Hovers over links outside the route set, or arriving while the user has
/// gone idle, are dropped before any timer is armed. The full gate
/// (including network conditions) is re-checked by the coordinator when
/// the timer fires.
pub struct IntentDetector {
    policy: Arc<RoutePolicy>,
    gate: Arc<PrefetchGate>,
    coordinator: Arc<FetchCoordinator>,
    debounce: Duration,
    pending: Arc<Mutex<Option<PendingIntent>>>,
    generation: Arc<AtomicU64>,
}

impl IntentDetector {
    /// Creates a detector feeding the given coordinator.
    #[must_use]
    pub fn new(
        policy: Arc<RoutePolicy>,
        gate: Arc<PrefetchGate>,
        coordinator: Arc<FetchCoordinator>,
        debounce: Duration,
    ) -> Self {
        Self {
            policy,
            gate,
            coordinator,
            debounce,
            pending: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reports the pointer entering a link with the given `href`.
    ///
    /// Arms the debounce timer when the href maps to a prefetchable route
    /// and the user was recently active. Any previously armed timer is
    /// cancelled and replaced, even for the same route.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the debounce timer
    /// runs as a spawned task.
    #[instrument(level = "debug", skip(self), fields(href = %href))]
    pub fn hover_enter(&self, href: &str) {
        let Some(route) = self.policy.classify(href) else {
            return;
        };

        if !self.gate.recently_active() {
            debug!("no recent interaction, hover ignored");
            return;
        }

        let mut pending = Self::lock_pending(&self.pending);
        if let Some(armed) = pending.take() {
            armed.abort.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(route = %route, "intent timer armed");
        let task = tokio::spawn(run_timer(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.pending),
            route.clone(),
            generation,
            self.debounce,
        ));
        *pending = Some(PendingIntent {
            route,
            generation,
            abort: task.abort_handle(),
        });
    }

    /// Reports the pointer leaving the hovered link.
    ///
    /// Cancels the armed timer, if any. A fetch already handed to the
    /// coordinator is not affected; leaving only wins the race while the
    /// debounce window is still open.
    pub fn hover_leave(&self) {
        let mut pending = Self::lock_pending(&self.pending);
        if let Some(armed) = pending.take() {
            debug!(route = %armed.route, "intent timer cancelled");
            armed.abort.abort();
        }
    }

    /// Returns the route whose debounce timer is currently armed, if any.
    #[must_use]
    pub fn pending_route(&self) -> Option<RouteId> {
        Self::lock_pending(&self.pending)
            .as_ref()
            .map(|armed| armed.route.clone())
    }

    fn lock_pending(
        pending: &Mutex<Option<PendingIntent>>,
    ) -> std::sync::MutexGuard<'_, Option<PendingIntent>> {
        pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for IntentDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDetector")
            .field("debounce", &self.debounce)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Waits out the debounce window, then hands the route to the coordinator.
///
/// The timer only acts if it still owns the pending slot when it fires; a
/// timer replaced by a newer hover finds a different generation and backs
/// off. The slot is released before the coordinator runs, so a fetch
/// request never executes under the pending lock.
async fn run_timer(
    coordinator: Arc<FetchCoordinator>,
    pending: Arc<Mutex<Option<PendingIntent>>>,
    route: RouteId,
    generation: u64,
    debounce: Duration,
) {
    tokio::time::sleep(debounce).await;

    {
        let mut slot = IntentDetector::lock_pending(&pending);
        let owns_slot = slot
            .as_ref()
            .is_some_and(|armed| armed.generation == generation);
        if !owns_slot {
            return;
        }
        *slot = None;
    }

    debug!(route = %route, "hover intent confirmed");
    coordinator.request(route);
}
