//! Optional text-enrichment collaborator
//!
//! An external service (in production, an LLM call) may derive extra tags
//! from a product's title and description. The pipeline must work with the
//! collaborator entirely absent, so the seam is a trait held as an
//! `Option<Arc<dyn TagEnricher>>` and enrichment failures are best-effort.

use std::sync::Arc;

/// Derives additional tags from product text
///
/// Implementations own any I/O they need; the pipeline calls this after a
/// URL settles and tolerates an empty answer.
pub trait TagEnricher: Send + Sync {
    fn enrich(&self, title: &str, description: &str) -> Vec<String>;
}

/// Shared handle type used by the orchestrator and coordinator
pub type EnricherHandle = Arc<dyn TagEnricher>;

/// Keyword-table enricher
///
/// Maps known ingredient/benefit keywords to tags. Stands in for the
/// external service in tests and offline runs.
#[derive(Debug, Default)]
pub struct KeywordEnricher;

impl TagEnricher for KeywordEnricher {
    fn enrich(&self, title: &str, description: &str) -> Vec<String> {
        const TABLE: &[(&str, &str)] = &[
            ("organic", "organic"),
            ("gluten free", "gluten-free"),
            ("gluten-free", "gluten-free"),
            ("vegan", "vegan"),
            ("sugar free", "sugar-free"),
            ("raw", "raw"),
            ("honey", "sweetener"),
            ("protein", "protein"),
        ];

        let haystack = format!("{} {}", title, description).to_lowercase();
        let mut tags = Vec::new();

        for (keyword, tag) in TABLE {
            if haystack.contains(keyword) && !tags.iter().any(|t: &String| t == tag) {
                tags.push(tag.to_string());
            }
        }

        tags
    }
}
