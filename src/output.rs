//! Run summary aggregation and display
//!
//! Aggregates per-site batch results into a single run summary and prints
//! it to stdout. Persistence of individual records lives in the storage
//! layer; this module only reports.

use crate::model::{Availability, ScrapingResult};
use std::collections::HashMap;

/// Aggregate summary of a multi-site run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Number of sites that ran
    pub sites: usize,

    /// Sites that produced at least one record
    pub successful_sites: usize,

    /// Total URLs requested across all sites
    pub total_requested: usize,

    /// Total records accepted across all sites
    pub total_scraped: usize,

    /// Total failed or skipped URLs across all sites
    pub total_errors: usize,

    /// Record counts per availability label
    pub by_availability: HashMap<&'static str, usize>,

    /// Lowest accepted price seen, with its site key
    pub min_price: Option<(f64, String)>,

    /// Highest accepted price seen, with its site key
    pub max_price: Option<(f64, String)>,
}

/// Builds the aggregate summary for a set of per-site results
pub fn summarize(results: &[ScrapingResult]) -> BatchSummary {
    let mut summary = BatchSummary {
        sites: results.len(),
        ..Default::default()
    };

    for result in results {
        if result.success {
            summary.successful_sites += 1;
        }
        summary.total_requested += result.total_requested;
        summary.total_scraped += result.total_scraped;
        summary.total_errors += result.error_count;

        for product in &result.products {
            *summary
                .by_availability
                .entry(product.availability.as_str())
                .or_insert(0) += 1;

            if let Some(price) = product.price {
                let lower = summary
                    .min_price
                    .as_ref()
                    .map(|(p, _)| price < *p)
                    .unwrap_or(true);
                if lower {
                    summary.min_price = Some((price, result.site_key.clone()));
                }

                let higher = summary
                    .max_price
                    .as_ref()
                    .map(|(p, _)| price > *p)
                    .unwrap_or(true);
                if higher {
                    summary.max_price = Some((price, result.site_key.clone()));
                }
            }
        }
    }

    summary
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &BatchSummary, results: &[ScrapingResult]) {
    println!("=== Scrape Summary ===\n");

    println!("Overview:");
    println!(
        "  Sites: {} ({} with results)",
        summary.sites, summary.successful_sites
    );
    println!("  URLs requested: {}", summary.total_requested);
    println!("  Records scraped: {}", summary.total_scraped);
    println!("  Failures/skips: {}", summary.total_errors);
    println!();

    println!("Per Site:");
    for result in results {
        let rate = if result.total_requested > 0 {
            (result.total_scraped as f64 / result.total_requested as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {}: {}/{} records ({:.1}%), {} errors",
            result.site_key, result.total_scraped, result.total_requested, rate, result.error_count
        );
    }
    println!();

    if !summary.by_availability.is_empty() {
        println!("Availability:");
        let mut counts: Vec<_> = summary.by_availability.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (label, count) in counts {
            println!("  {}: {}", label, count);
        }
        println!();
    }

    if let Some((price, site)) = &summary.min_price {
        println!("Lowest price: {:.2} ({})", price, site);
    }
    if let Some((price, site)) = &summary.max_price {
        println!("Highest price: {:.2} ({})", price, site);
    }
}
