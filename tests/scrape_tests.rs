//! Integration tests for the scraping pipeline
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! full per-URL state machine end-to-end: robots checks, rate limiting,
//! retries, extraction, caching, and fallback.

use pricelens::config::{Config, PriceFormat, ScraperConfig, SiteProfile, UserAgentConfig};
use pricelens::model::ScrapingOptions;
use pricelens::robots::RobotsChecker;
use pricelens::{MultiSiteCoordinator, SiteOrchestrator, SiteRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCT_PAGE: &str = r#"<html><head><title>ignored</title></head><body>
    <h1 class="product-title">Organic Wildflower Honey 500g</h1>
    <span class="price">$12.99</span>
    <div class="stock">In Stock</div>
</body></html>"#;

/// Creates a test configuration with one site pointed at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut selectors = HashMap::new();
    selectors.insert("title".to_string(), ".product-title".to_string());
    selectors.insert("price".to_string(), ".price".to_string());
    selectors.insert("availability".to_string(), ".stock".to_string());

    Config {
        scraper: ScraperConfig {
            max_retries: 2,
            retry_base_ms: 10, // Very short for testing
            site_cooldown_ms: 10,
            request_timeout_secs: 5,
            robots_timeout_secs: 5,
            ..Default::default()
        },
        user_agent: UserAgentConfig {
            user_agent: "PricelensTest/1.0".to_string(),
            accept_language: "en-US".to_string(),
        },
        sites: vec![SiteProfile {
            key: "shop".to_string(),
            name: "Test Shop".to_string(),
            base_url: base_url.to_string(),
            selectors,
            price_format: PriceFormat::default(),
            min_interval_ms: 10,
            headers: HashMap::new(),
            enabled: true,
            categories: vec!["grocery".to_string()],
        }],
    }
}

fn orchestrator_for(config: &Config) -> SiteOrchestrator {
    let registry = SiteRegistry::from_config(config);
    let robots = Arc::new(
        RobotsChecker::new(
            config.scraper.robots_timeout_secs,
            config.scraper.robots_cache_ttl_secs,
        )
        .expect("robots checker"),
    );
    SiteOrchestrator::new(
        &registry,
        "shop",
        &config.scraper,
        &config.user_agent,
        robots,
    )
    .expect("orchestrator")
}

async fn mount_allow_all_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_single_site() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PRODUCT_PAGE)
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let coordinator = MultiSiteCoordinator::new(&config).unwrap();

    let urls = vec![format!("{}/p/1", server.uri())];
    let results = coordinator
        .scrape_all(&urls, &ScrapingOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(result.success);
    assert_eq!(result.total_scraped, 1);
    assert_eq!(result.error_count, 0);

    let product = &result.products[0];
    assert_eq!(
        product.title.as_deref(),
        Some("Organic Wildflower Honey 500g")
    );
    assert_eq!(product.price, Some(12.99));
    assert_eq!(product.site_key, "shop");
}

#[tokio::test]
async fn test_robots_disallow_skips_without_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .mount(&server)
        .await;

    // The product page must never be requested.
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.scraper.allow_fallback = false;

    let mut orchestrator = orchestrator_for(&config);
    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error_count, 1);
    assert!(result.errors[0].error.contains("robots"));
}

#[tokio::test]
async fn test_retry_recovers_after_transient_errors() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    // Two 503s, then a success: with max_retries = 2 the third attempt
    // lands inside the budget.
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);

    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.total_scraped, 1);
    // A real extraction, not a synthetic stand-in.
    assert_eq!(
        result.products[0].title.as_deref(),
        Some("Organic Wildflower Honey 500g")
    );
}

#[tokio::test]
async fn test_cached_url_not_refetched() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);
    let urls = vec![format!("{}/p/1", server.uri())];

    let first = orchestrator
        .scrape_products(&urls, &ScrapingOptions::default())
        .await
        .unwrap();
    let second = orchestrator
        .scrape_products(&urls, &ScrapingOptions::default())
        .await
        .unwrap();

    assert_eq!(first.total_scraped, 1);
    assert_eq!(second.total_scraped, 1);
    assert_eq!(first.products[0].title, second.products[0].title);
    // wiremock verifies the expect(1) on drop.
}

#[tokio::test]
async fn test_fallback_on_persistent_failure() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);

    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.total_scraped, 1);
    let product = &result.products[0];
    assert!(product.sku.as_deref().unwrap_or("").starts_with("SYN-"));
    assert_eq!(product.scraped_at, chrono::DateTime::UNIX_EPOCH);
}

#[tokio::test]
async fn test_failure_without_fallback() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.scraper.allow_fallback = false;
    config.scraper.max_retries = 1;

    let mut orchestrator = orchestrator_for(&config);
    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error_count, 1);
    assert!(result.errors[0].error.contains("500"));
}

#[tokio::test]
async fn test_rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    for i in 0..3 {
        Mock::given(method("GET"))
            .and(path(format!("/p/{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&server.uri());
    config.sites[0].min_interval_ms = 250;

    let mut orchestrator = orchestrator_for(&config);
    let urls: Vec<String> = (0..3).map(|i| format!("{}/p/{}", server.uri(), i)).collect();

    let started = std::time::Instant::now();
    let result = orchestrator
        .scrape_products(&urls, &ScrapingOptions::default())
        .await
        .unwrap();

    assert_eq!(result.total_scraped, 3);
    // Three fetches, two enforced gaps.
    assert!(started.elapsed() >= std::time::Duration::from_millis(500));
}

#[tokio::test]
async fn test_max_products_leaves_remaining_urls_untouched() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    for i in 0..5 {
        let expected = if i < 2 { 1 } else { 0 };
        Mock::given(method("GET"))
            .and(path(format!("/p/{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
            .expect(expected)
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);
    let urls: Vec<String> = (0..5).map(|i| format!("{}/p/{}", server.uri(), i)).collect();

    let options = ScrapingOptions {
        max_products: Some(2),
        ..Default::default()
    };

    let result = orchestrator.scrape_products(&urls, &options).await.unwrap();

    assert_eq!(result.total_scraped, 2);
    assert_eq!(result.error_count, 0);
    assert_eq!(result.total_requested, 5);
}

#[tokio::test]
async fn test_missing_robots_allows_crawling() {
    let server = MockServer::start().await;

    // No robots.txt mock: the request 404s and the site is treated as
    // allow-all.
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);

    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.total_scraped, 1);
}

#[tokio::test]
async fn test_extreme_crawl_delay_still_settles_url() {
    let server = MockServer::start().await;

    // "inf" parses as f64 but is not a usable delay; the fetch must
    // proceed on the configured interval instead of aborting the batch.
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: inf"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let mut orchestrator = orchestrator_for(&config);

    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.total_scraped, 1);
    assert_eq!(
        result.products[0].title.as_deref(),
        Some("Organic Wildflower Honey 500g")
    );
}

#[tokio::test]
async fn test_malformed_robots_denies_crawling() {
    let server = MockServer::start().await;

    // Directive before any User-agent group is a parse error; the site is
    // conservatively treated as deny-all.
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Disallow: /private"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.scraper.allow_fallback = false;

    let mut orchestrator = orchestrator_for(&config);
    let result = orchestrator
        .scrape_products(
            &[format!("{}/p/1", server.uri())],
            &ScrapingOptions::default(),
        )
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error_count, 1);
}
