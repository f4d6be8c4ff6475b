//! Deterministic synthetic record generation
//!
//! When live extraction is disabled or a URL's retry budget is exhausted,
//! the orchestrator can degrade to a synthetic placeholder derived from the
//! URL's hash: the same URL always yields the same record, so downstream
//! diffing and dedup behave across runs.

use crate::config::SiteProfile;
use crate::model::{Availability, ScrapedProduct};
use chrono::DateTime;
use sha2::{Digest, Sha256};

/// Generates the synthetic placeholder record for a URL
///
/// Every field, including the timestamp, derives from the URL hash or the
/// profile, so repeated generation is byte-identical. The fixed epoch
/// timestamp doubles as a marker that the record never came from a live
/// page.
pub fn synthetic_product(url: &str, profile: &SiteProfile) -> ScrapedProduct {
    let digest = Sha256::digest(url.as_bytes());
    let seed = u64::from_be_bytes(digest[0..8].try_into().expect("digest too short"));
    let short_hash = hex::encode(&digest[0..4]);

    // Price in cents, 5.00 to 99.99
    let price_cents = 500 + seed % 9500;
    let original_cents = price_cents + price_cents / 5;

    let rating = 3.0 + ((seed >> 8) % 21) as f64 / 10.0;
    let review_count = ((seed >> 16) % 500) as u32;
    let stock_level = (1 + (seed >> 24) % 200) as u32;

    let category = profile
        .categories
        .first()
        .cloned()
        .unwrap_or_else(|| "general".to_string());

    ScrapedProduct {
        url: url.to_string(),
        title: Some(format!("{} Sample Product {}", profile.name, short_hash)),
        price: Some(price_cents as f64 / 100.0),
        original_price: Some(original_cents as f64 / 100.0),
        currency: profile.price_format.currency_code.clone(),
        availability: Availability::InStock,
        stock_level: Some(stock_level),
        description: Some(format!(
            "Representative {} listing generated for {}",
            category, profile.name
        )),
        brand: Some(profile.name.clone()),
        sku: Some(format!("SYN-{}", short_hash.to_uppercase())),
        category: Some(category),
        tags: Vec::new(),
        image_url: None,
        rating: Some(rating),
        review_count: Some(review_count),
        site_key: profile.key.clone(),
        site_name: profile.name.clone(),
        scraped_at: DateTime::UNIX_EPOCH,
    }
}
