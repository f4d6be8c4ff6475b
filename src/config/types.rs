use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure for Pricelens
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub sites: Vec<SiteProfile>,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Maximum retries per URL after the initial attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay between retries (milliseconds); the effective
    /// delay is this value multiplied by the attempt number
    #[serde(rename = "retry-base-ms", default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Cooldown between sites in a batch run (milliseconds)
    #[serde(rename = "site-cooldown-ms", default = "default_site_cooldown_ms")]
    pub site_cooldown_ms: u64,

    /// Timeout for product page requests (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for robots.txt requests (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,

    /// TTL for cached robots.txt rulesets (seconds)
    #[serde(rename = "robots-cache-ttl-secs", default = "default_cache_ttl")]
    pub robots_cache_ttl_secs: u64,

    /// TTL for cached extraction results (seconds)
    #[serde(rename = "result-cache-ttl-secs", default = "default_cache_ttl")]
    pub result_cache_ttl_secs: u64,

    /// Maximum entries per per-site result cache
    #[serde(rename = "result-cache-capacity", default = "default_cache_capacity")]
    pub result_cache_capacity: usize,

    /// Whether to issue real HTTP requests; when false, every URL is served
    /// by the deterministic fallback generator
    #[serde(rename = "live-fetch", default = "default_true")]
    pub live_fetch: bool,

    /// Whether exhausted URLs may degrade to synthetic records
    #[serde(rename = "allow-fallback", default = "default_true")]
    pub allow_fallback: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            site_cooldown_ms: default_site_cooldown_ms(),
            request_timeout_secs: default_request_timeout(),
            robots_timeout_secs: default_robots_timeout(),
            robots_cache_ttl_secs: default_cache_ttl(),
            result_cache_ttl_secs: default_cache_ttl(),
            result_cache_capacity: default_cache_capacity(),
            live_fetch: true,
            allow_fallback: true,
        }
    }
}

/// Request identity configuration
///
/// Product pages are fetched with a realistic browser header set; sites that
/// fingerprint obvious bot user agents serve degraded or empty markup.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent header for all outbound requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// Static per-target-site profile
///
/// Describes where a competitor site lives, how to pull fields out of its
/// markup, and how politely it must be treated. Immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteProfile {
    /// Identifying key (e.g. "acme-foods")
    pub key: String,

    /// Human-readable display name
    pub name: String,

    /// Base URL of the site, used for URL partitioning and link resolution
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Field name -> comma-separated candidate CSS selectors, tried in order
    #[serde(default)]
    pub selectors: HashMap<String, String>,

    /// Price format conventions for this site
    #[serde(rename = "price-format", default)]
    pub price_format: PriceFormat,

    /// Minimum interval between requests to this site (milliseconds)
    #[serde(rename = "min-interval-ms", default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Extra request headers sent with every fetch to this site
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Whether this site participates in batch runs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Category tags for registry lookups
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Price formatting conventions of a target site
#[derive(Debug, Clone, Deserialize)]
pub struct PriceFormat {
    /// Currency symbol appearing next to prices (e.g. "$")
    #[serde(rename = "currency-symbol", default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// ISO currency code emitted in records (e.g. "USD")
    #[serde(rename = "currency-code", default = "default_currency_code")]
    pub currency_code: String,

    /// Decimal separator character
    #[serde(rename = "decimal-separator", default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// Thousands separator character
    #[serde(
        rename = "thousands-separator",
        default = "default_thousands_separator"
    )]
    pub thousands_separator: char,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            currency_code: default_currency_code(),
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_ms() -> u64 {
    2000
}

fn default_site_cooldown_ms() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_robots_timeout() -> u64 {
    5
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    100
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_thousands_separator() -> char {
    ','
}
