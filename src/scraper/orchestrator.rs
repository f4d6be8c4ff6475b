//! Per-site retry/fallback orchestration
//!
//! Drives one site's scrape across a list of URLs. Each URL walks a fixed
//! state machine: cache check, robots check, rate-limited fetch with
//! retries, then a fallback decision. Terminal states are Success, Failed,
//! and Skipped (robots-denied); per-URL errors never escape the
//! orchestrator, they are collected into the batch result.

use crate::config::{ScraperConfig, SiteProfile, UserAgentConfig};
use crate::enrich::EnricherHandle;
use crate::model::{ProductFailure, ScrapeOutcome, ScrapingOptions, ScrapingResult};
use crate::registry::SiteRegistry;
use crate::robots::RobotsChecker;
use crate::scraper::{
    build_http_client, extract, fetch_page, synthetic_product, FetchOutcome, FetchQueue,
    ResultCache,
};
use crate::{Result, ScrapeError};
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Terminal state of one URL's scrape
enum UrlOutcome {
    Success(ScrapeOutcome),
    Skipped(String),
    Failed(String),
}

/// Orchestrates scraping for a single site
///
/// Owns the site's fetch queue and result cache; shares the process-wide
/// robots checker, since crawl policies are per-domain rather than
/// per-profile.
pub struct SiteOrchestrator {
    profile: SiteProfile,
    settings: ScraperConfig,
    user_agent: UserAgentConfig,
    client: Client,
    queue: FetchQueue,
    cache: ResultCache,
    robots: Arc<RobotsChecker>,
    enricher: Option<EnricherHandle>,
}

impl SiteOrchestrator {
    /// Creates an orchestrator for the given site key
    ///
    /// An unknown key is a configuration error and fails construction;
    /// everything later is reported per URL instead.
    pub fn new(
        registry: &SiteRegistry,
        site_key: &str,
        settings: &ScraperConfig,
        user_agent: &UserAgentConfig,
        robots: Arc<RobotsChecker>,
    ) -> Result<Self> {
        let profile = registry
            .get(site_key)
            .ok_or_else(|| ScrapeError::UnknownSite(site_key.to_string()))?
            .clone();

        Self::from_profile(profile, settings, user_agent, robots)
    }

    /// Creates an orchestrator directly from a profile
    pub fn from_profile(
        profile: SiteProfile,
        settings: &ScraperConfig,
        user_agent: &UserAgentConfig,
        robots: Arc<RobotsChecker>,
    ) -> Result<Self> {
        let client = build_http_client(user_agent, settings.request_timeout_secs)?;
        let cache = ResultCache::new(
            chrono::Duration::seconds(settings.result_cache_ttl_secs as i64),
            settings.result_cache_capacity,
        );

        Ok(Self {
            profile,
            settings: settings.clone(),
            user_agent: user_agent.clone(),
            client,
            queue: FetchQueue::new(),
            cache,
            robots,
            enricher: None,
        })
    }

    /// Attaches an optional tag enricher
    pub fn with_enricher(mut self, enricher: EnricherHandle) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Scrapes a list of URLs for this site
    ///
    /// URLs are processed in the order supplied. Post-extraction filters
    /// from `options` apply after each URL settles: a record extracted
    /// successfully but filtered out is omitted, not a failure. Once
    /// `max_products` records have been accepted the loop stops and the
    /// remaining URLs are absent from the report entirely.
    pub async fn scrape_products(
        &mut self,
        urls: &[String],
        options: &ScrapingOptions,
    ) -> Result<ScrapingResult> {
        options.validate().map_err(ScrapeError::Validation)?;

        tracing::info!(
            site = %self.profile.key,
            urls = urls.len(),
            live = self.settings.live_fetch,
            "Starting site scrape"
        );

        let mut products = Vec::new();
        let mut errors: Vec<ProductFailure> = Vec::new();
        let mut success_count = 0usize;

        for url in urls {
            if let Some(max) = options.max_products {
                if products.len() >= max {
                    tracing::debug!(site = %self.profile.key, "max_products reached, stopping");
                    break;
                }
            }

            match self.scrape_one(url, options.accept_title_only).await {
                UrlOutcome::Success(outcome) => {
                    let mut product = outcome.into_product();

                    if let Some(enricher) = &self.enricher {
                        let extra = enricher.enrich(
                            product.title.as_deref().unwrap_or(""),
                            product.description.as_deref().unwrap_or(""),
                        );
                        for tag in extra {
                            if !product.tags.contains(&tag) {
                                product.tags.push(tag);
                            }
                        }
                    }

                    // Filters apply before anything is counted: a record
                    // extracted and then filtered out is neither a success
                    // nor a failure.
                    if options.accepts(&product) {
                        success_count += 1;
                        products.push(product);
                    } else {
                        tracing::trace!("Record for {} filtered out by options", url);
                    }
                }
                UrlOutcome::Skipped(reason) => {
                    tracing::info!("Skipping {}: {}", url, reason);
                    errors.push(ProductFailure {
                        url: url.clone(),
                        error: reason,
                    });
                }
                UrlOutcome::Failed(reason) => {
                    tracing::warn!("Failed {}: {}", url, reason);
                    errors.push(ProductFailure {
                        url: url.clone(),
                        error: reason,
                    });
                }
            }
        }

        let success = !products.is_empty();
        let result = ScrapingResult {
            site_key: self.profile.key.clone(),
            site_name: self.profile.name.clone(),
            total_requested: urls.len(),
            total_scraped: products.len(),
            success_count,
            error_count: errors.len(),
            products,
            errors,
            timestamp: Utc::now(),
            requested_urls: urls.to_vec(),
            success,
        };

        tracing::info!(
            site = %result.site_key,
            scraped = result.total_scraped,
            failed = result.error_count,
            "Site scrape complete"
        );

        Ok(result)
    }

    /// Runs the per-URL state machine to a terminal state
    async fn scrape_one(&mut self, url: &str, accept_title_only: bool) -> UrlOutcome {
        // CacheCheck: a live entry is trusted fully for its TTL window and
        // skips robots, rate limiting, and the fetch.
        if let Some(product) = self.cache.get(url) {
            tracing::debug!("Cache hit for {}", url);
            return UrlOutcome::Success(ScrapeOutcome::Real(product));
        }

        if !self.settings.live_fetch {
            return self.fallback_or_fail(url, "live fetching disabled");
        }

        // RobotsCheck
        let decision = match self
            .robots
            .is_allowed(url, &self.user_agent.user_agent)
            .await
        {
            Ok(decision) => decision,
            Err(e) => return UrlOutcome::Failed(e.to_string()),
        };

        if !decision.allowed {
            return UrlOutcome::Skipped(
                decision
                    .reason
                    .unwrap_or_else(|| "blocked by robots.txt".to_string()),
            );
        }

        // The site may declare a stricter interval than our configuration.
        // The conversion is fallible; a delay the parser let through that
        // still cannot form a Duration is ignored rather than panicking.
        let mut min_interval = Duration::from_millis(self.profile.min_interval_ms);
        if let Some(delay) = decision.crawl_delay {
            if let Ok(declared) = Duration::try_from_secs_f64(delay.max(0.0)) {
                if declared > min_interval {
                    min_interval = declared;
                }
            }
        }

        // FetchAndExtract with retry budget: max_retries is the number of
        // retries after the initial attempt.
        let mut last_error = String::new();
        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(self.settings.retry_base_ms * attempt as u64);
                tracing::debug!(
                    "Retry {}/{} for {} in {:?}",
                    attempt,
                    self.settings.max_retries,
                    url,
                    backoff
                );
                sleep(backoff).await;
            }

            let outcome = self
                .queue
                .schedule(min_interval, || {
                    fetch_page(&self.client, url, &self.profile.headers)
                })
                .await;

            match outcome {
                FetchOutcome::Success { body, .. } => {
                    let product = extract(&body, &self.profile, url);
                    let usable =
                        product.title.is_some() && (product.price.is_some() || accept_title_only);

                    if usable {
                        // CacheWrite applies only to real fetch successes.
                        self.cache.put(url, product.clone());
                        return UrlOutcome::Success(ScrapeOutcome::Real(product));
                    }

                    // Static markup will not change on retry.
                    last_error = "no usable fields extracted".to_string();
                    break;
                }
                other => {
                    last_error = other.describe();
                    tracing::debug!(
                        "Attempt {} for {} failed: {}",
                        attempt + 1,
                        url,
                        last_error
                    );
                }
            }
        }

        self.fallback_or_fail(url, &last_error)
    }

    /// FallbackDecision: degrade to a synthetic record if permitted
    fn fallback_or_fail(&self, url: &str, reason: &str) -> UrlOutcome {
        if self.settings.allow_fallback {
            tracing::debug!("Synthesizing fallback record for {} ({})", url, reason);
            UrlOutcome::Success(ScrapeOutcome::Fallback(synthetic_product(
                url,
                &self.profile,
            )))
        } else {
            UrlOutcome::Failed(reason.to_string())
        }
    }

    /// The profile this orchestrator was built for
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }
}
