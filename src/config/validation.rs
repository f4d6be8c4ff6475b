use crate::config::types::Config;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates a parsed configuration
///
/// Checks performed:
/// - scraper timing values are non-zero
/// - at least one site profile is defined
/// - site keys are unique and non-empty
/// - base URLs parse and use http(s)
/// - enabled sites declare at least a title selector
///
/// # Arguments
///
/// * `config` - The configuration to validate
///
/// # Returns
///
/// * `Ok(())` - Configuration is valid
/// * `Err(ConfigError)` - Validation failed with a description
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.scraper.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.scraper.robots_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "robots-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.scraper.result_cache_capacity == 0 {
        return Err(ConfigError::Validation(
            "result-cache-capacity must be greater than 0".to_string(),
        ));
    }

    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[sites]] profile is required".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();

    for site in &config.sites {
        if site.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site key must not be empty".to_string(),
            ));
        }

        if !seen_keys.insert(site.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site key: {}",
                site.key
            )));
        }

        let parsed = Url::parse(&site.base_url)
            .map_err(|_| ConfigError::InvalidUrl(site.base_url.clone()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(site.base_url.clone()));
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(site.base_url.clone()));
        }

        if site.min_interval_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "site {}: min-interval-ms must be greater than 0",
                site.key
            )));
        }

        // A profile without a title selector can never produce a usable
        // record, so catch it at load time rather than at scrape time.
        if site.enabled && !site.selectors.contains_key("title") {
            return Err(ConfigError::Validation(format!(
                "site {}: enabled profiles must define a title selector",
                site.key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{PriceFormat, ScraperConfig, SiteProfile, UserAgentConfig};
    use std::collections::HashMap;

    fn test_site(key: &str) -> SiteProfile {
        let mut selectors = HashMap::new();
        selectors.insert("title".to_string(), "h1".to_string());
        selectors.insert("price".to_string(), ".price".to_string());

        SiteProfile {
            key: key.to_string(),
            name: format!("{} Store", key),
            base_url: format!("https://{}.example.com", key),
            selectors,
            price_format: PriceFormat::default(),
            min_interval_ms: 1000,
            headers: HashMap::new(),
            enabled: true,
            categories: vec!["grocery".to_string()],
        }
    }

    fn test_config() -> Config {
        Config {
            scraper: ScraperConfig::default(),
            user_agent: UserAgentConfig::default(),
            sites: vec![test_site("acme")],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&test_config()).is_ok());
    }

    #[test]
    fn test_empty_sites_rejected() {
        let mut config = test_config();
        config.sites.clear();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut config = test_config();
        config.sites.push(test_site("acme"));
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut config = test_config();
        config.sites[0].key = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = test_config();
        config.sites[0].base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = test_config();
        config.sites[0].base_url = "ftp://acme.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = test_config();
        config.sites[0].min_interval_ms = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_title_selector_rejected() {
        let mut config = test_config();
        config.sites[0].selectors.remove("title");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_disabled_site_may_omit_selectors() {
        let mut config = test_config();
        config.sites[0].selectors.clear();
        config.sites[0].enabled = false;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_cache_capacity_rejected() {
        let mut config = test_config();
        config.scraper.result_cache_capacity = 0;
        assert!(validate(&config).is_err());
    }
}
