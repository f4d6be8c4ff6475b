//! Configuration loading and validation
//!
//! Site profiles and scraper behavior are defined in a TOML file supplied at
//! process start. The configuration is static: profiles are never mutated at
//! runtime.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, PriceFormat, ScraperConfig, SiteProfile, UserAgentConfig};
pub use validation::validate;
