//! Pricelens: competitor price-intelligence scraping pipeline
//!
//! This crate fetches third-party retail product pages under politeness
//! constraints (robots.txt, per-site rate limits), extracts structured
//! product records from unreliable markup, caches results, and degrades to
//! deterministic synthetic records when real extraction is disabled or
//! exhausted.

pub mod config;
pub mod enrich;
pub mod model;
pub mod output;
pub mod registry;
pub mod robots;
pub mod scraper;
pub mod storage;

use thiserror::Error;

/// Main error type for Pricelens operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown site key: {0}")]
    UnknownSite(String),

    #[error("URL disallowed by robots.txt: {url}")]
    PolicyDenied { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("No usable fields extracted from {url}")]
    ExtractionEmpty { url: String },

    #[error("Invalid scraping options: {0}")]
    Validation(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pricelens operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Availability, ScrapedProduct, ScrapingOptions, ScrapingResult};
pub use registry::SiteRegistry;
pub use robots::{RobotsChecker, RobotsDecision};
pub use scraper::{MultiSiteCoordinator, SiteOrchestrator};
