//! Multi-site scrape coordination
//!
//! Partitions a mixed URL list by host against the registry's enabled
//! profiles, then runs each site's orchestrator in sequence with a cooldown
//! between sites. One site failing outright never aborts the batch; its
//! result is recorded as wholly failed and the run continues.

use crate::config::{Config, ScraperConfig, SiteProfile, UserAgentConfig};
use crate::enrich::EnricherHandle;
use crate::model::{ScrapingOptions, ScrapingResult};
use crate::registry::SiteRegistry;
use crate::robots::RobotsChecker;
use crate::scraper::SiteOrchestrator;
use crate::{Result, ScrapeError};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use url::Url;

/// Runs scrapes across every enabled site in the registry
///
/// The robots checker is shared across all orchestrators so a domain's
/// policy is fetched once per process, not once per site run.
pub struct MultiSiteCoordinator {
    registry: SiteRegistry,
    settings: ScraperConfig,
    user_agent: UserAgentConfig,
    robots: Arc<RobotsChecker>,
    enricher: Option<EnricherHandle>,
}

impl MultiSiteCoordinator {
    pub fn new(config: &Config) -> Result<Self> {
        let robots = Arc::new(RobotsChecker::new(
            config.scraper.robots_timeout_secs,
            config.scraper.robots_cache_ttl_secs,
        )?);

        Ok(Self {
            registry: SiteRegistry::from_config(config),
            settings: config.scraper.clone(),
            user_agent: config.user_agent.clone(),
            robots,
            enricher: None,
        })
    }

    /// Attaches an optional tag enricher, passed down to every orchestrator
    pub fn with_enricher(mut self, enricher: EnricherHandle) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Scrapes a URL list for one named site
    pub async fn scrape_site(
        &self,
        site_key: &str,
        urls: &[String],
        options: &ScrapingOptions,
    ) -> Result<ScrapingResult> {
        let mut orchestrator = self.orchestrator_for(site_key)?;
        orchestrator.scrape_products(urls, options).await
    }

    /// Scrapes a mixed URL list across all enabled sites
    ///
    /// Each URL is routed to the enabled profile whose base URL shares its
    /// host; URLs matching no enabled site are logged and dropped. Sites run
    /// sequentially in registry order, separated by the configured cooldown.
    /// Every enabled site appears in the output, with an empty result when
    /// no URLs routed to it.
    pub async fn scrape_all(
        &self,
        urls: &[String],
        options: &ScrapingOptions,
    ) -> Result<Vec<ScrapingResult>> {
        options.validate().map_err(ScrapeError::Validation)?;

        let sites = self.registry.list_enabled();
        let mut partitions: Vec<Vec<String>> = vec![Vec::new(); sites.len()];

        for url in urls {
            let Some(host) = host_of(url) else {
                tracing::warn!("Ignoring unparseable URL: {}", url);
                continue;
            };

            match sites
                .iter()
                .position(|profile| profile_host(profile).as_deref() == Some(host.as_str()))
            {
                Some(idx) => partitions[idx].push(url.clone()),
                None => {
                    tracing::warn!("No enabled site matches host {} ({})", host, url);
                }
            }
        }

        tracing::info!(
            sites = sites.len(),
            urls = urls.len(),
            "Starting multi-site scrape"
        );

        let cooldown = Duration::from_millis(self.settings.site_cooldown_ms);
        let mut results = Vec::with_capacity(sites.len());
        let mut ran_a_site = false;

        for (profile, site_urls) in sites.iter().zip(&partitions) {
            if site_urls.is_empty() {
                results.push(ScrapingResult::all_failed(
                    &profile.key,
                    &profile.name,
                    &[],
                    "",
                ));
                continue;
            }

            if ran_a_site {
                tracing::debug!("Cooling down {:?} before {}", cooldown, profile.key);
                sleep(cooldown).await;
            }
            ran_a_site = true;

            let result = match self.orchestrator_for(&profile.key) {
                Ok(mut orchestrator) => {
                    match orchestrator.scrape_products(site_urls, options).await {
                        Ok(result) => result,
                        Err(e) => ScrapingResult::all_failed(
                            &profile.key,
                            &profile.name,
                            site_urls,
                            &e.to_string(),
                        ),
                    }
                }
                Err(e) => ScrapingResult::all_failed(
                    &profile.key,
                    &profile.name,
                    site_urls,
                    &e.to_string(),
                ),
            };

            results.push(result);
        }

        Ok(results)
    }

    fn orchestrator_for(&self, site_key: &str) -> Result<SiteOrchestrator> {
        let mut orchestrator = SiteOrchestrator::new(
            &self.registry,
            site_key,
            &self.settings,
            &self.user_agent,
            self.robots.clone(),
        )?;

        if let Some(enricher) = &self.enricher {
            orchestrator = orchestrator.with_enricher(enricher.clone());
        }

        Ok(orchestrator)
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_ascii_lowercase())
}

fn profile_host(profile: &SiteProfile) -> Option<String> {
    host_of(&profile.base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceFormat;
    use std::collections::HashMap;
    use tokio::time::Instant;

    fn site(key: &str, host: &str, enabled: bool) -> SiteProfile {
        let mut selectors = HashMap::new();
        selectors.insert("title".to_string(), "h1".to_string());

        SiteProfile {
            key: key.to_string(),
            name: format!("{} Store", key),
            base_url: format!("https://{}", host),
            selectors,
            price_format: PriceFormat::default(),
            min_interval_ms: 10,
            headers: HashMap::new(),
            enabled,
            categories: vec![],
        }
    }

    fn offline_config(sites: Vec<SiteProfile>) -> Config {
        Config {
            scraper: ScraperConfig {
                live_fetch: false,
                site_cooldown_ms: 10,
                ..Default::default()
            },
            user_agent: UserAgentConfig::default(),
            sites,
        }
    }

    #[tokio::test]
    async fn test_urls_partitioned_by_host() {
        let config = offline_config(vec![
            site("acme", "acme.example.com", true),
            site("beta", "beta.example.com", true),
        ]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let urls = vec![
            "https://acme.example.com/p/1".to_string(),
            "https://beta.example.com/p/1".to_string(),
            "https://acme.example.com/p/2".to_string(),
        ];

        let results = coordinator
            .scrape_all(&urls, &ScrapingOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].site_key, "acme");
        assert_eq!(results[0].total_scraped, 2);
        assert_eq!(results[1].site_key, "beta");
        assert_eq!(results[1].total_scraped, 1);
        assert!(results[0]
            .products
            .iter()
            .all(|p| p.url.starts_with("https://acme.example.com")));
    }

    #[tokio::test]
    async fn test_unmatched_urls_dropped() {
        let config = offline_config(vec![site("acme", "acme.example.com", true)]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let urls = vec![
            "https://acme.example.com/p/1".to_string(),
            "https://stranger.example.org/p/9".to_string(),
            "not a url at all".to_string(),
        ];

        let results = coordinator
            .scrape_all(&urls, &ScrapingOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_requested, 1);
        assert_eq!(results[0].total_scraped, 1);
    }

    #[tokio::test]
    async fn test_disabled_site_excluded() {
        let config = offline_config(vec![
            site("acme", "acme.example.com", true),
            site("dark", "dark.example.com", false),
        ]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let urls = vec![
            "https://acme.example.com/p/1".to_string(),
            "https://dark.example.com/p/1".to_string(),
        ];

        let results = coordinator
            .scrape_all(&urls, &ScrapingOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].site_key, "acme");
    }

    #[tokio::test]
    async fn test_site_without_urls_gets_empty_result() {
        let config = offline_config(vec![
            site("acme", "acme.example.com", true),
            site("idle", "idle.example.com", true),
        ]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let results = coordinator
            .scrape_all(
                &["https://acme.example.com/p/1".to_string()],
                &ScrapingOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let idle = results.iter().find(|r| r.site_key == "idle").unwrap();
        assert_eq!(idle.total_requested, 0);
        assert!(!idle.success);
    }

    #[tokio::test]
    async fn test_cooldown_between_sites() {
        let mut config = offline_config(vec![
            site("acme", "acme.example.com", true),
            site("beta", "beta.example.com", true),
        ]);
        config.scraper.site_cooldown_ms = 150;
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let urls = vec![
            "https://acme.example.com/p/1".to_string(),
            "https://beta.example.com/p/1".to_string(),
        ];

        let started = Instant::now();
        coordinator
            .scrape_all(&urls, &ScrapingOptions::default())
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_scrape_site_unknown_key() {
        let config = offline_config(vec![site("acme", "acme.example.com", true)]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let result = coordinator
            .scrape_site(
                "ghost",
                &["https://acme.example.com/p/1".to_string()],
                &ScrapingOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(ScrapeError::UnknownSite(_))));
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let config = offline_config(vec![site("acme", "acme.example.com", true)]);
        let coordinator = MultiSiteCoordinator::new(&config).unwrap();

        let options = ScrapingOptions {
            min_price: Some(9.0),
            max_price: Some(1.0),
            ..Default::default()
        };

        let result = coordinator.scrape_all(&[], &options).await;
        assert!(matches!(result, Err(ScrapeError::Validation(_))));
    }
}
