//! Selector-based field extraction
//!
//! Pulls a [`ScrapedProduct`] out of raw markup using a site profile's
//! selector map. Extraction is total: a missing or unparseable field becomes
//! `None`, never an error, so one broken selector cannot abort the rest of
//! the record.

use crate::config::{PriceFormat, SiteProfile};
use crate::model::{Availability, ScrapedProduct};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Maximum characters kept from any extracted text node; pathological
/// markup must not inflate records
const MAX_TEXT_LEN: usize = 1000;

/// Extracts a product record from markup
///
/// Each profile field may list multiple comma-separated candidate
/// selectors, tried in order; the first selector matching a non-empty node
/// wins. Text resolution tries element text, then the `content` attribute,
/// then the `value` attribute, accommodating both visible text and
/// `<meta>`-style tags.
///
/// # Arguments
///
/// * `html` - Raw page markup
/// * `profile` - The site profile with selectors and price format
/// * `source_url` - The page URL, used for image resolution and the record
pub fn extract(html: &str, profile: &SiteProfile, source_url: &str) -> ScrapedProduct {
    let document = Html::parse_document(html);
    let page_url = Url::parse(source_url).ok();

    let field = |name: &str| -> Option<String> {
        profile
            .selectors
            .get(name)
            .and_then(|candidates| select_field(&document, candidates))
    };

    let title = field("title");
    let price = field("price").and_then(|text| parse_price(&text, &profile.price_format));
    let original_price =
        field("original_price").and_then(|text| parse_price(&text, &profile.price_format));

    let availability = field("availability")
        .map(|text| Availability::from_text(&text))
        .unwrap_or(Availability::Unknown);

    let image_url = field("image")
        .and_then(|raw| page_url.as_ref().and_then(|base| resolve_url(&raw, base)));

    let rating = field("rating").and_then(|text| parse_rating(&text));
    let review_count = field("review_count").and_then(|text| parse_count(&text));
    let stock_level = field("stock_level").and_then(|text| parse_count(&text));

    ScrapedProduct {
        url: source_url.to_string(),
        title,
        price,
        original_price,
        currency: profile.price_format.currency_code.clone(),
        availability,
        stock_level,
        description: field("description"),
        brand: field("brand"),
        sku: field("sku"),
        category: field("category"),
        tags: Vec::new(),
        image_url,
        rating,
        review_count,
        site_key: profile.key.clone(),
        site_name: profile.name.clone(),
        scraped_at: Utc::now(),
    }
}

/// Tries each comma-separated candidate selector in order and returns the
/// first non-empty text
fn select_field(document: &Html, candidates: &str) -> Option<String> {
    for candidate in candidates.split(',') {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }

        let selector = match Selector::parse(candidate) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!("Invalid selector {:?}, skipping", candidate);
                continue;
            }
        };

        for element in document.select(&selector) {
            if let Some(text) = node_text(&element) {
                return Some(text);
            }
        }
    }

    None
}

/// Resolves the text of a matched node: text content, then `content`
/// attribute, then `value` attribute
fn node_text(element: &ElementRef) -> Option<String> {
    let text: String = element.text().collect::<String>().trim().to_string();
    if !text.is_empty() {
        return Some(truncate(&text));
    }

    for attr in ["content", "value"] {
        if let Some(value) = element.value().attr(attr) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(truncate(value));
            }
        }
    }

    None
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_LEN {
        text.to_string()
    } else {
        text.chars().take(MAX_TEXT_LEN).collect()
    }
}

/// Parses a price string using the site's format conventions
///
/// Strips everything except digits, comma, and period, drops thousands
/// separators, then parses a decimal. Failures yield `None`: a missing
/// price must never abort the rest of the record.
pub fn parse_price(text: &str, format: &PriceFormat) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let without_thousands = cleaned.replace(format.thousands_separator, "");
    let normalized = if format.decimal_separator != '.' {
        without_thousands.replace(format.decimal_separator, ".")
    } else {
        without_thousands
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Takes the first numeric token from the text and clamps it to [0, 5]
fn parse_rating(text: &str) -> Option<f64> {
    first_number(text).map(|n| n.clamp(0.0, 5.0))
}

/// Parses the first run of digits as a count
fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

/// Finds the first decimal number in free text
fn first_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    token.trim_end_matches('.').parse().ok()
}

/// Resolves a possibly relative image URL against the page
///
/// Protocol-relative (`//host/...`) and root-relative (`/path`) URLs are
/// resolved against the page's origin so emitted URLs are always absolute.
fn resolve_url(raw: &str, page_url: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("//") {
        return Some(format!("{}:{}", page_url.scheme(), raw));
    }

    if raw.contains("://") {
        return Some(raw.to_string());
    }

    page_url.join(raw).ok().map(|u| u.to_string())
}
