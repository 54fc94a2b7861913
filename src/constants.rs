//! Constants for prefetch timing and request shaping.

use std::time::Duration;

/// Default hover debounce before a prefetch fires (150 milliseconds).
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Default freshness window for cached prefetch results (60 seconds).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Default trailing window in which the user counts as recently active (5 seconds).
pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_secs(5);

/// Header marking prefetch requests as programmatic rather than full navigations.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Value servers expect on background requests issued by page scripts.
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";
