//! Domain-keyed caching of parsed crawl policies

use crate::robots::RobotsRules;
use chrono::{DateTime, Duration, Utc};

/// Cached ruleset for one domain
///
/// Stores the parsed policy alongside the fetch timestamp so the checker
/// can expire and sweep entries.
#[derive(Debug, Clone)]
pub struct CachedRules {
    /// The parsed crawl policy
    pub rules: RobotsRules,

    /// When the robots.txt was fetched (or its absence recorded)
    pub fetched_at: DateTime<Utc>,
}

impl CachedRules {
    /// Creates a cache entry stamped with the current time
    pub fn new(rules: RobotsRules) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is older than the TTL and must be re-fetched
    pub fn is_stale(&self, ttl: Duration) -> bool {
        Utc::now() - self.fetched_at > ttl
    }

    /// Whether the entry is older than twice the TTL and should be removed
    /// by the on-access sweep to bound memory
    pub fn is_evictable(&self, ttl: Duration) -> bool {
        Utc::now() - self.fetched_at > ttl * 2
    }
}
