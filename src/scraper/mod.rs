//! Scraping pipeline
//!
//! The pipeline composes, bottom-up: a rate-limited fetch queue, the field
//! extractor, a per-site result cache, and a deterministic fallback
//! generator, driven per site by [`SiteOrchestrator`] and across sites by
//! [`MultiSiteCoordinator`].

mod cache;
mod coordinator;
mod extractor;
mod fallback;
mod fetcher;
mod orchestrator;
mod queue;

pub use cache::ResultCache;
pub use coordinator::MultiSiteCoordinator;
pub use extractor::extract;
pub use fallback::synthetic_product;
pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use orchestrator::SiteOrchestrator;
pub use queue::FetchQueue;
