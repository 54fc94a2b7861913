//! Network-quality and interaction-recency gating.
//!
//! Before any speculative fetch, two questions get asked: is the network
//! good enough to spend on a guess, and has the user actually been around
//! recently? [`PrefetchGate`] answers both. The network half reads a
//! [`NetworkMonitor`], a trait seam because most runtimes have no
//! connection signal at all; the activity half reads the shared
//! [`InteractionClock`].
//!
//! Two deliberate polarities live here:
//!
//! - unknown network quality **permits** (fail-open — absence of a signal
//!   is not treated as a slow link)
//! - a *quiet* user **denies**: prefetching requires an interaction within
//!   the trailing idle window, on the theory that someone who stopped
//!   touching the page is not about to navigate it

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Effective connection class, as reported by the runtime's network
/// information signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveType {
    /// Slowest class; never worth a speculative fetch.
    Slow2g,
    /// Slow class; never worth a speculative fetch.
    TwoG,
    /// Moderate class; fast enough to speculate on.
    ThreeG,
    /// Fast class.
    FourG,
}

impl EffectiveType {
    /// Returns true for the connection classes too slow to prefetch over.
    #[must_use]
    pub fn is_slow(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// A point-in-time reading of the runtime's connection quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Whether the user asked the runtime to reduce data usage.
    pub save_data: bool,
    /// Reported effective connection class.
    pub effective_type: EffectiveType,
}

/// Source of connection-quality readings.
///
/// Implementations report `None` when the runtime exposes no network
/// information; the gate treats that as no constraint.
pub trait NetworkMonitor: Send + Sync {
    /// Returns the current connection reading, if the runtime has one.
    fn connection(&self) -> Option<ConnectionInfo>;
}

/// Monitor for runtimes with no network information signal.
///
/// Always reads `None`, so the network half of the gate always permits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConnectionInfo;

impl NetworkMonitor for NoConnectionInfo {
    fn connection(&self) -> Option<ConnectionInfo> {
        None
    }
}

/// Monitor returning one fixed reading.
///
/// For embedders that sample their environment once at startup, and for
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedConnection(pub Option<ConnectionInfo>);

impl NetworkMonitor for FixedConnection {
    fn connection(&self) -> Option<ConnectionInfo> {
        self.0
    }
}

/// Process-wide record of the most recent qualifying user interaction.
///
/// Updated by [`touch`](Self::touch) on every interaction event the
/// embedder forwards; read by the gate to compute idleness. Stored as
/// milliseconds since construction in an atomic, so touching never blocks
/// and the clock is shareable across tasks without a lock. A freshly
/// constructed clock counts as touched, so prefetching works immediately
/// after startup.
#[derive(Debug)]
pub struct InteractionClock {
    epoch: Instant,
    last_touch_ms: AtomicU64,
}

impl InteractionClock {
    /// Creates a clock whose last interaction is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_touch_ms: AtomicU64::new(0),
        }
    }

    /// Records a user interaction at the current instant.
    pub fn touch(&self) {
        self.last_touch_ms
            .store(self.elapsed_ms(), Ordering::SeqCst);
    }

    /// Returns how long ago the last interaction was recorded.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        let now_ms = self.elapsed_ms();
        let last_ms = self.last_touch_ms.load(Ordering::SeqCst);
        Duration::from_millis(now_ms.saturating_sub(last_ms))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for InteractionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined permission check for speculative fetching.
///
/// The fetch path evaluates [`permits`](Self::permits) at decision time,
/// never caching the answer; the intent path pre-checks only
/// [`recently_active`](Self::recently_active) so a hover while the user is
/// gated never even arms a timer. Denials log at debug level with their
/// reason and are otherwise silent.
pub struct PrefetchGate {
    monitor: Arc<dyn NetworkMonitor>,
    clock: Arc<InteractionClock>,
    idle_window: Duration,
}

impl PrefetchGate {
    /// Creates a gate over the given monitor and clock.
    #[must_use]
    pub fn new(
        monitor: Arc<dyn NetworkMonitor>,
        clock: Arc<InteractionClock>,
        idle_window: Duration,
    ) -> Self {
        Self {
            monitor,
            clock,
            idle_window,
        }
    }

    /// Returns true when both the network and activity halves permit.
    #[must_use]
    pub fn permits(&self) -> bool {
        self.network_permits() && self.recently_active()
    }

    /// Returns true unless the runtime reports a constrained network.
    ///
    /// A missing reading permits; an explicit save-data preference or a
    /// slow effective class denies.
    #[must_use]
    pub fn network_permits(&self) -> bool {
        match self.monitor.connection() {
            None => true,
            Some(info) if info.save_data => {
                debug!("save-data preference set, prefetch blocked");
                false
            }
            Some(info) if info.effective_type.is_slow() => {
                debug!(
                    effective_type = ?info.effective_type,
                    "slow connection, prefetch blocked"
                );
                false
            }
            Some(_) => true,
        }
    }

    /// Returns true when an interaction was recorded strictly within the
    /// idle window.
    #[must_use]
    pub fn recently_active(&self) -> bool {
        let idle = self.clock.idle_for();
        if idle < self.idle_window {
            true
        } else {
            debug!(idle_ms = idle.as_millis(), "no recent interaction, prefetch blocked");
            false
        }
    }
}
