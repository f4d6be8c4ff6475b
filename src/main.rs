//! Pricelens main entry point
//!
//! This is the command-line interface for the Pricelens price scraper.

use anyhow::Context;
use clap::Parser;
use pricelens::config::load_config_with_hash;
use pricelens::enrich::KeywordEnricher;
use pricelens::model::ScrapingOptions;
use pricelens::output::{print_summary, summarize};
use pricelens::storage::{open_sink, ResultSink, RunStatus};
use pricelens::MultiSiteCoordinator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pricelens: A polite competitor price scraper
///
/// Pricelens fetches competitor product pages while respecting robots.txt
/// and per-site rate limits, extracts normalized price records, and
/// aggregates them into per-site reports.
#[derive(Parser, Debug)]
#[command(name = "pricelens")]
#[command(version = "1.0.0")]
#[command(about = "A polite competitor price scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// File of product URLs to scrape, one per line
    #[arg(long, value_name = "FILE")]
    urls: Option<PathBuf>,

    /// Restrict the run to a single site key
    #[arg(long, value_name = "KEY")]
    site: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching
    #[arg(long)]
    dry_run: bool,

    /// Skip live fetching and emit deterministic fallback records
    #[arg(long)]
    fallback_only: bool,

    /// Include records that are not purchasable
    #[arg(long)]
    include_out_of_stock: bool,

    /// Inclusive lower price bound
    #[arg(long, value_name = "PRICE")]
    min_price: Option<f64>,

    /// Inclusive upper price bound
    #[arg(long, value_name = "PRICE")]
    max_price: Option<f64>,

    /// Category allow-list (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Keyword allow-list matched against title and description (repeatable)
    #[arg(long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,

    /// Stop after this many accepted records per site
    #[arg(long, value_name = "N")]
    max_products: Option<usize>,

    /// Persist results to this SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Print the stored price history for a URL and exit (requires --database)
    #[arg(long, value_name = "URL", requires = "database")]
    history: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.fallback_only {
        config.scraper.live_fetch = false;
    }

    // clap enforces that --history comes with --database.
    if let (Some(url), Some(database)) = (&cli.history, &cli.database) {
        return handle_history(database, url);
    }

    if cli.dry_run {
        return handle_dry_run(&config, &cli);
    }

    handle_scrape(config, config_hash, cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pricelens=info,warn"),
            1 => EnvFilter::new("pricelens=debug,info"),
            2 => EnvFilter::new("pricelens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the per-run options from CLI flags
fn options_from(cli: &Cli) -> ScrapingOptions {
    ScrapingOptions {
        include_out_of_stock: cli.include_out_of_stock,
        min_price: cli.min_price,
        max_price: cli.max_price,
        categories: cli.categories.clone(),
        keywords: cli.keywords.clone(),
        max_products: cli.max_products,
        accept_title_only: false,
    }
}

/// Reads the URL file, skipping blank lines and # comments
fn read_urls(path: &std::path::Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &pricelens::config::Config, cli: &Cli) -> anyhow::Result<()> {
    println!("=== Pricelens Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Max retries: {}", config.scraper.max_retries);
    println!("  Retry base delay: {}ms", config.scraper.retry_base_ms);
    println!("  Site cooldown: {}ms", config.scraper.site_cooldown_ms);
    println!(
        "  Request timeout: {}s",
        config.scraper.request_timeout_secs
    );
    println!("  Live fetching: {}", config.scraper.live_fetch);
    println!("  Fallback records: {}", config.scraper.allow_fallback);
    println!(
        "  Result cache: {} entries, {}s TTL",
        config.scraper.result_cache_capacity, config.scraper.result_cache_ttl_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent);

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        let status = if site.enabled { "enabled" } else { "disabled" };
        println!(
            "  - {} [{}]: {} ({} selectors, {}ms interval)",
            site.key,
            status,
            site.base_url,
            site.selectors.len(),
            site.min_interval_ms
        );
    }

    let url_count = match &cli.urls {
        Some(path) => read_urls(path)?.len(),
        None => 0,
    };

    println!("\n✓ Configuration is valid");
    println!("✓ Would scrape {} URLs", url_count);

    Ok(())
}

/// Handles the --history mode: prints stored price observations for a URL
fn handle_history(database: &std::path::Path, url: &str) -> anyhow::Result<()> {
    let sink = open_sink(database)?;
    let history = sink.price_history(url)?;

    if history.is_empty() {
        println!("No price history for {}", url);
        return Ok(());
    }

    println!("Price history for {}:", url);
    for point in history {
        println!(
            "  run {}: {:.2} {} ({})",
            point.run_id, point.price, point.currency, point.scraped_at
        );
    }

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: pricelens::config::Config,
    config_hash: String,
    cli: Cli,
) -> anyhow::Result<()> {
    let urls = match &cli.urls {
        Some(path) => read_urls(path)
            .with_context(|| format!("failed to read URL file {}", path.display()))?,
        None => anyhow::bail!("no URLs to scrape; pass --urls <FILE>"),
    };
    tracing::info!("Loaded {} URLs", urls.len());

    let options = options_from(&cli);
    let coordinator =
        MultiSiteCoordinator::new(&config)?.with_enricher(Arc::new(KeywordEnricher));

    let results = match &cli.site {
        Some(key) => vec![coordinator.scrape_site(key, &urls, &options).await?],
        None => coordinator.scrape_all(&urls, &options).await?,
    };

    if let Some(database) = &cli.database {
        let mut sink = open_sink(database)?;
        let run_id = sink.create_run(&config_hash)?;

        let mut status = RunStatus::Completed;
        for result in &results {
            if let Err(e) = sink.record_result(run_id, result) {
                tracing::error!("Failed to persist results for {}: {}", result.site_key, e);
                status = RunStatus::Failed;
            }
        }
        sink.complete_run(run_id, status)?;
        tracing::info!(
            "Persisted {} records to {}",
            sink.count_products(run_id)?,
            database.display()
        );
    }

    let summary = summarize(&results);
    print_summary(&summary, &results);

    if summary.total_scraped == 0 {
        tracing::warn!("Run produced no records");
    }

    Ok(())
}
