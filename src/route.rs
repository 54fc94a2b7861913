//! Destination identity and allow-list classification.
//!
//! Every cache lookup and in-flight check in the crate is keyed by a
//! [`RouteId`]: the origin-relative path a candidate destination normalizes
//! to. [`RoutePolicy`] produces them, enforcing the two eligibility rules
//! for speculative fetching:
//!
//! - same-origin only, ever (cross-origin prefetching is a security hole)
//! - allow-list membership, so a hover can never trigger a side-effecting
//!   route such as a logout link

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::{ConfigError, PrefetchConfig};

/// Normalized origin-relative path used as the uniform key for caching and
/// in-flight tracking.
///
/// Two hrefs that resolve to the same origin and path share one identity;
/// query strings and fragments are not part of it. Identities are normally
/// obtained from [`RoutePolicy::identity`] or [`RoutePolicy::classify`];
/// [`RouteId::new`] performs no normalization of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId(String);

impl RouteId {
    /// Wraps an already-normalized path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Same-origin and allow-list rules for candidate destinations.
///
/// # Example
///
/// ```
/// use nav_prefetch::{PrefetchConfig, RoutePolicy};
///
/// let config = PrefetchConfig::new("https://app.example.com", ["/", "/leads"]);
/// let policy = RoutePolicy::from_config(&config).unwrap();
///
/// // Relative and absolute same-origin forms normalize to one identity.
/// let id = policy.classify("/leads?page=2").unwrap();
/// assert_eq!(id.as_str(), "/leads");
/// assert_eq!(policy.classify("https://app.example.com/leads").unwrap(), id);
///
/// // Cross-origin and unlisted destinations are never eligible.
/// assert!(policy.classify("https://other.example.com/leads").is_none());
/// assert!(policy.classify("/logout").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    origin: Url,
    routes: HashSet<String>,
}

impl RoutePolicy {
    /// Builds a policy from a config, validating origin and allow-list.
    ///
    /// The origin must be an http(s) URL with a host; any path, query, or
    /// fragment on it is dropped so relative hrefs resolve against the bare
    /// origin. Each allow-listed route is resolved against that origin, so
    /// `"leads"`, `"/leads"`, and the absolute same-origin form configure
    /// the same route.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOrigin`] for an unparsable origin, a
    /// non-http(s) scheme, or a missing host; [`ConfigError::NoRoutes`] for
    /// an empty allow-list; [`ConfigError::ForeignRoute`] for a route entry
    /// that resolves outside the origin.
    pub fn from_config(config: &PrefetchConfig) -> Result<Self, ConfigError> {
        let origin = parse_origin(&config.origin)?;

        if config.routes.is_empty() {
            return Err(ConfigError::NoRoutes);
        }

        let mut routes = HashSet::with_capacity(config.routes.len());
        for route in &config.routes {
            let resolved = origin
                .join(route)
                .map_err(|_| ConfigError::foreign_route(route))?;
            if resolved.origin() != origin.origin() {
                return Err(ConfigError::foreign_route(route));
            }
            routes.insert(resolved.path().to_string());
        }

        Ok(Self { origin, routes })
    }

    /// Resolves a candidate href to its identity, without the allow-list
    /// check.
    ///
    /// Returns `None` when the href does not parse or resolves to a
    /// different origin. This is the identity rule on its own: cache
    /// lookups key through it so a cross-origin target can never alias a
    /// cached same-origin route.
    #[must_use]
    pub fn identity(&self, href: &str) -> Option<RouteId> {
        let resolved = self.origin.join(href).ok()?;
        if resolved.origin() != self.origin.origin() {
            return None;
        }
        Some(RouteId::new(resolved.path()))
    }

    /// Resolves a candidate href to an identity eligible for speculative
    /// fetching.
    ///
    /// Eligible means: parses, same origin, and the normalized path is in
    /// the allow-list. Anything else returns `None`.
    #[must_use]
    pub fn classify(&self, href: &str) -> Option<RouteId> {
        let id = self.identity(href)?;
        self.routes.contains(id.as_str()).then_some(id)
    }

    /// Returns the origin candidates resolve against.
    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Returns the number of allow-listed routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

/// Parses and normalizes the configured origin down to scheme + host + port.
///
/// # Validation rules:
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme (no ftp, file, etc.)
/// - Must have a host (domain or IP)
fn parse_origin(origin: &str) -> Result<Url, ConfigError> {
    let mut parsed = Url::parse(origin)
        .map_err(|_| ConfigError::invalid_origin(origin, "not an absolute URL"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(ConfigError::invalid_origin(
                origin,
                "scheme must be http or https",
            ));
        }
    }

    if parsed.host().is_none() {
        return Err(ConfigError::invalid_origin(origin, "missing host"));
    }

    parsed.set_path("/");
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}
