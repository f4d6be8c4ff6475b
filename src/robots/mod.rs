//! Robots.txt compliance
//!
//! Fetches, parses, and caches per-domain crawl policies, and answers
//! allow/deny plus crawl-delay for a given URL. Absent policies (network
//! failure, 404) are permissive; malformed policies are conservatively
//! treated as deny-all.

mod cache;
mod checker;
mod parser;

pub use cache::CachedRules;
pub use checker::RobotsChecker;
pub use parser::RobotsRules;

/// Decision for one URL against a domain's crawl policy
#[derive(Debug, Clone, PartialEq)]
pub struct RobotsDecision {
    /// Whether the fetch may proceed
    pub allowed: bool,

    /// Site-declared minimum interval between requests, in seconds
    pub crawl_delay: Option<f64>,

    /// Denial reason, when `allowed` is false
    pub reason: Option<String>,
}
