//! Normalized product records and batch result types
//!
//! Everything crossing the pipeline boundary is an explicit typed record:
//! the extractor emits [`ScrapedProduct`], the orchestrator aggregates them
//! into a [`ScrapingResult`], and callers shape a run with
//! [`ScrapingOptions`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock availability state of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    InStock,
    OutOfStock,
    Limited,
    PreOrder,
    Unknown,
}

impl Availability {
    /// Normalizes a free-text availability string
    ///
    /// Matching is by substring in a fixed priority order; anything
    /// unmatched is `Unknown`, which downstream filters treat as
    /// unavailable.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("in stock") || lower.contains("in-stock") || lower.contains("available")
        {
            Availability::InStock
        } else if lower.contains("out of stock")
            || lower.contains("out-of-stock")
            || lower.contains("unavailable")
            || lower.contains("sold out")
        {
            Availability::OutOfStock
        } else if lower.contains("limited") || lower.contains("low stock") {
            Availability::Limited
        } else if lower.contains("pre-order") || lower.contains("preorder") {
            Availability::PreOrder
        } else {
            Availability::Unknown
        }
    }

    /// Whether this state counts as purchasable for stock filtering
    ///
    /// `Unknown` is conservatively treated as not purchasable.
    pub fn is_purchasable(&self) -> bool {
        matches!(
            self,
            Availability::InStock | Availability::Limited | Availability::PreOrder
        )
    }

    /// Stable label used in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Limited => "limited",
            Availability::PreOrder => "pre_order",
            Availability::Unknown => "unknown",
        }
    }
}

/// Normalized product record produced by extraction or fallback
///
/// Invariants: `price` and `original_price`, when present, are
/// non-negative; `rating`, when present, is clamped to [0, 5].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    /// Source page URL
    pub url: String,

    /// Product title; records without a title are never usable
    pub title: Option<String>,

    /// Current numeric price, if parseable
    pub price: Option<f64>,

    /// Original/list price, if the page shows one
    pub original_price: Option<f64>,

    /// ISO currency code from the site profile
    pub currency: String,

    pub availability: Availability,

    /// Stock level, if the page exposes a count
    pub stock_level: Option<u32>,

    pub description: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Absolute image URL
    pub image_url: Option<String>,

    /// Average rating in [0, 5]
    pub rating: Option<f64>,
    pub review_count: Option<u32>,

    /// Key of the site profile that produced this record
    pub site_key: String,
    /// Display name of the site
    pub site_name: String,

    /// When extraction happened
    pub scraped_at: DateTime<Utc>,
}

impl ScrapedProduct {
    /// Whether the record carries both core fields (title and price)
    pub fn has_core_fields(&self) -> bool {
        self.title.is_some() && self.price.is_some()
    }
}

/// Outcome of one URL's scrape, tagged by provenance
///
/// Real results come from a live fetch and are cacheable; fallback results
/// are synthesized and never written to the result cache.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Real(ScrapedProduct),
    Fallback(ScrapedProduct),
}

impl ScrapeOutcome {
    pub fn is_real(&self) -> bool {
        matches!(self, ScrapeOutcome::Real(_))
    }

    pub fn product(&self) -> &ScrapedProduct {
        match self {
            ScrapeOutcome::Real(p) | ScrapeOutcome::Fallback(p) => p,
        }
    }

    pub fn into_product(self) -> ScrapedProduct {
        match self {
            ScrapeOutcome::Real(p) | ScrapeOutcome::Fallback(p) => p,
        }
    }
}

/// Per-call scraping policy
#[derive(Debug, Clone, Default)]
pub struct ScrapingOptions {
    /// Include records that are not purchasable
    pub include_out_of_stock: bool,

    /// Inclusive lower price bound
    pub min_price: Option<f64>,

    /// Inclusive upper price bound
    pub max_price: Option<f64>,

    /// Category allow-list; empty means all categories pass
    pub categories: Vec<String>,

    /// Keyword allow-list matched against title + description; empty means
    /// all records pass
    pub keywords: Vec<String>,

    /// Stop the URL loop once this many records have been accepted
    pub max_products: Option<usize>,

    /// Accept records that carry a title but no parseable price
    pub accept_title_only: bool,
}

impl ScrapingOptions {
    /// Validates option values before a run starts
    pub fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_products {
            if max == 0 {
                return Err("max_products must be greater than 0".to_string());
            }
        }

        if let Some(min) = self.min_price {
            if min < 0.0 {
                return Err("min_price must be non-negative".to_string());
            }
        }

        if let Some(max) = self.max_price {
            if max < 0.0 {
                return Err("max_price must be non-negative".to_string());
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(format!(
                    "min_price ({}) exceeds max_price ({})",
                    min, max
                ));
            }
        }

        Ok(())
    }

    /// Applies the post-extraction filters to a settled record
    ///
    /// A record that fails a filter is omitted from the result, not counted
    /// as a failure.
    pub fn accepts(&self, product: &ScrapedProduct) -> bool {
        if !self.accept_title_only && !product.has_core_fields() {
            return false;
        }

        if product.title.is_none() {
            return false;
        }

        if !self.include_out_of_stock && !product.availability.is_purchasable() {
            return false;
        }

        if let Some(price) = product.price {
            if let Some(min) = self.min_price {
                if price < min {
                    return false;
                }
            }
            if let Some(max) = self.max_price {
                if price > max {
                    return false;
                }
            }
        } else if self.min_price.is_some() || self.max_price.is_some() {
            // A price filter cannot pass a record with no price.
            return false;
        }

        if !self.categories.is_empty() {
            let matched = product
                .category
                .as_deref()
                .map(|c| {
                    self.categories
                        .iter()
                        .any(|allowed| c.eq_ignore_ascii_case(allowed))
                })
                .unwrap_or(false);
            if !matched {
                return false;
            }
        }

        if !self.keywords.is_empty() {
            let haystack = format!(
                "{} {}",
                product.title.as_deref().unwrap_or(""),
                product.description.as_deref().unwrap_or("")
            )
            .to_lowercase();

            let matched = self
                .keywords
                .iter()
                .any(|kw| haystack.contains(&kw.to_lowercase()));
            if !matched {
                return false;
            }
        }

        true
    }
}

/// A per-URL failure recorded in a batch result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFailure {
    pub url: String,
    pub error: String,
}

/// Per-site batch outcome, immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub site_key: String,
    pub site_name: String,

    /// Number of URLs originally requested
    pub total_requested: usize,

    /// Number of URLs actually attempted (cache hits included)
    pub total_scraped: usize,

    /// Number of accepted records
    pub success_count: usize,

    /// Number of failed or skipped URLs
    pub error_count: usize,

    pub products: Vec<ScrapedProduct>,
    pub errors: Vec<ProductFailure>,

    /// Completion timestamp (RFC 3339)
    pub timestamp: DateTime<Utc>,

    /// The URLs originally requested, in order
    pub requested_urls: Vec<String>,

    /// True iff at least one URL produced a usable record
    pub success: bool,
}

impl ScrapingResult {
    /// Builds a wholly-failed result for a site whose orchestration failed
    /// outright (configuration error, not per-URL failures)
    pub fn all_failed(site_key: &str, site_name: &str, urls: &[String], error: &str) -> Self {
        let errors = urls
            .iter()
            .map(|url| ProductFailure {
                url: url.clone(),
                error: error.to_string(),
            })
            .collect::<Vec<_>>();

        Self {
            site_key: site_key.to_string(),
            site_name: site_name.to_string(),
            total_requested: urls.len(),
            total_scraped: 0,
            success_count: 0,
            error_count: errors.len(),
            products: Vec::new(),
            errors,
            timestamp: Utc::now(),
            requested_urls: urls.to_vec(),
            success: false,
        }
    }
}
