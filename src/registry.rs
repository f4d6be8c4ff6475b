//! Site profile registry
//!
//! Pure lookups over the static profile set loaded from configuration. A
//! missing key is a configuration error on the caller's side, not a runtime
//! failure of the registry.

use crate::config::{Config, SiteProfile};

/// Keyed registry of site profiles, built once at process start
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    profiles: Vec<SiteProfile>,
}

impl SiteRegistry {
    /// Builds a registry from a validated configuration
    ///
    /// Profile order is preserved; batch runs iterate in this order.
    pub fn from_config(config: &Config) -> Self {
        Self {
            profiles: config.sites.clone(),
        }
    }

    /// Looks up a profile by key
    pub fn get(&self, key: &str) -> Option<&SiteProfile> {
        self.profiles.iter().find(|p| p.key == key)
    }

    /// Returns all enabled profiles in registry order
    pub fn list_enabled(&self) -> Vec<&SiteProfile> {
        self.profiles.iter().filter(|p| p.enabled).collect()
    }

    /// Returns enabled profiles tagged with the given category
    pub fn list_by_category(&self, tag: &str) -> Vec<&SiteProfile> {
        self.profiles
            .iter()
            .filter(|p| p.enabled && p.categories.iter().any(|c| c.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Total number of profiles, enabled or not
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PriceFormat, ScraperConfig, UserAgentConfig};
    use std::collections::HashMap;

    fn site(key: &str, enabled: bool, categories: &[&str]) -> SiteProfile {
        let mut selectors = HashMap::new();
        selectors.insert("title".to_string(), "h1".to_string());

        SiteProfile {
            key: key.to_string(),
            name: format!("{} Store", key),
            base_url: format!("https://{}.example.com", key),
            selectors,
            price_format: PriceFormat::default(),
            min_interval_ms: 1000,
            headers: HashMap::new(),
            enabled,
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn registry() -> SiteRegistry {
        let config = Config {
            scraper: ScraperConfig::default(),
            user_agent: UserAgentConfig::default(),
            sites: vec![
                site("acme", true, &["grocery"]),
                site("globex", true, &["grocery", "health"]),
                site("initech", false, &["health"]),
            ],
        };
        SiteRegistry::from_config(&config)
    }

    #[test]
    fn test_get_known_key() {
        let registry = registry();
        let profile = registry.get("globex").unwrap();
        assert_eq!(profile.name, "globex Store");
    }

    #[test]
    fn test_get_unknown_key() {
        assert!(registry().get("nonexistent").is_none());
    }

    #[test]
    fn test_list_enabled_preserves_order() {
        let registry = registry();
        let enabled = registry.list_enabled();
        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0].key, "acme");
        assert_eq!(enabled[1].key, "globex");
    }

    #[test]
    fn test_list_by_category_skips_disabled() {
        let registry = registry();
        let health = registry.list_by_category("health");
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].key, "globex");
    }

    #[test]
    fn test_list_by_category_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.list_by_category("GROCERY").len(), 2);
    }
}
