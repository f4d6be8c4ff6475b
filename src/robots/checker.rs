//! Robots compliance checker with a shared domain cache
//!
//! One checker instance is constructed at process start and shared across
//! orchestrators behind an `Arc`: policies are per-domain, not per-site
//! profile. Cache writes are idempotent, so a racing duplicate fetch wastes
//! one request at worst and never corrupts state.

use crate::robots::{CachedRules, RobotsDecision, RobotsRules};
use crate::Result;
use chrono::Duration;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Fetches and caches per-domain crawl policies
pub struct RobotsChecker {
    client: Client,
    cache: Mutex<HashMap<String, CachedRules>>,
    ttl: Duration,
}

impl RobotsChecker {
    /// Creates a checker with the given robots.txt fetch timeout and cache
    /// TTL
    pub fn new(timeout_secs: u64, cache_ttl_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            cache: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(cache_ttl_secs as i64),
        })
    }

    /// Decides whether a URL may be fetched by the given user agent
    ///
    /// Consults the domain cache first; on a miss or stale entry, fetches
    /// `<origin>/robots.txt`. Network failure and 404 mean "no policy" and
    /// are cached as allow-all; a fetched file that fails to parse is cached
    /// as deny-all.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL about to be fetched
    /// * `user_agent` - The user agent the fetch will carry
    pub async fn is_allowed(&self, url: &str, user_agent: &str) -> Result<RobotsDecision> {
        let parsed = Url::parse(url)?;
        parsed.host_str().ok_or(url::ParseError::EmptyHost)?;
        let origin = parsed.origin().ascii_serialization();
        let path = parsed.path().to_string();

        let cached = {
            let mut cache = self.cache.lock().expect("robots cache poisoned");

            // On-access sweep: drop anything older than twice the TTL so the
            // map stays bounded across long runs.
            cache.retain(|_, entry| !entry.is_evictable(self.ttl));

            cache
                .get(&origin)
                .filter(|entry| !entry.is_stale(self.ttl))
                .map(|entry| entry.rules.clone())
        };

        let rules = match cached {
            Some(rules) => {
                tracing::trace!("robots cache hit for {}", origin);
                rules
            }
            None => {
                let rules = self.fetch_rules(&origin, user_agent).await;
                let mut cache = self.cache.lock().expect("robots cache poisoned");
                cache.insert(origin.clone(), CachedRules::new(rules.clone()));
                rules
            }
        };

        let allowed = rules.is_allowed(&path, user_agent);
        let crawl_delay = rules.crawl_delay(user_agent);

        Ok(RobotsDecision {
            allowed,
            crawl_delay,
            reason: if allowed {
                None
            } else {
                Some("blocked by robots.txt".to_string())
            },
        })
    }

    /// Fetches and parses robots.txt for an origin
    ///
    /// Absence of a policy (network error, non-success status) is
    /// permissive; a present-but-malformed policy is restrictive.
    async fn fetch_rules(&self, origin: &str, user_agent: &str) -> RobotsRules {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(content) => match RobotsRules::parse(&content) {
                    Ok(rules) => rules,
                    Err(e) => {
                        tracing::warn!("Malformed robots.txt at {}: {}; denying", robots_url, e);
                        RobotsRules::deny_all()
                    }
                },
                Err(e) => {
                    tracing::debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
                    RobotsRules::allow_all()
                }
            },
            Ok(resp) => {
                tracing::debug!(
                    "No robots.txt at {} (status {}); allowing",
                    robots_url,
                    resp.status()
                );
                RobotsRules::allow_all()
            }
            Err(e) => {
                tracing::debug!("robots.txt fetch failed for {}: {}; allowing", robots_url, e);
                RobotsRules::allow_all()
            }
        }
    }

    /// Number of cached domains (for diagnostics)
    pub fn cached_domains(&self) -> usize {
        self.cache.lock().expect("robots cache poisoned").len()
    }
}

impl std::fmt::Debug for RobotsChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotsChecker")
            .field("ttl", &self.ttl)
            .field("cached_domains", &self.cached_domains())
            .finish()
    }
}
