//! Sitemap-Harvest main entry point
//!
//! This is the command-line interface for the Sitemap-Harvest crawler.

use clap::Parser;
use std::path::PathBuf;
use sitemap_harvest::cache::{CacheStore, SqliteCache};
use sitemap_harvest::config::{load_config, Config};
use sitemap_harvest::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Sitemap-Harvest: a caching site-map crawler
///
/// Sitemap-Harvest walks a site's index pages to enumerate its content pages,
/// fetches them concurrently, and caches both the URL structure and the raw
/// responses so later runs can skip either stage.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A caching site-map crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Load the URL structure from the cache instead of traversing
    #[arg(long)]
    read_structure_cache: bool,

    /// Load raw responses from the cache instead of fetching
    #[arg(long)]
    read_response_cache: bool,

    /// Write every fetched page to the html directory
    #[arg(long)]
    debug: bool,

    /// Validate config and show what would run without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// List the entries in the cache store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Flags only ever switch modes on
    config.crawler.read_structure_cache |= cli.read_structure_cache;
    config.crawler.read_response_cache |= cli.read_response_cache;
    config.crawler.debug_mode |= cli.debug;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
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

fn stage(read_cache: bool, cached: &str, computed: &str) -> String {
    if read_cache {
        format!("read from cache ({})", cached)
    } else {
        computed.to_string()
    }
}

/// Handles the --dry-run mode: shows the resolved configuration and plan
fn handle_dry_run(config: &Config) {
    println!("=== Sitemap-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Site map: {}", config.crawler.site_map_url);
    println!("  Structure cache key: {}", config.crawler.cache_key);
    println!("  Response cache key: {}", config.crawler.url_cache_key);
    match config.crawler.fetch_limit {
        Some(limit) => println!("  Fetch limit: {}", limit),
        None => println!("  Fetch limit: none"),
    }

    println!("\nFetch:");
    println!(
        "  Max concurrent requests: {}",
        config.fetch.max_concurrent_requests
    );
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nSite:");
    println!("  Index pattern: {}", config.site.index_pattern);
    println!("  Content pattern: {}", config.site.content_pattern);
    println!("  Max depth: {}", config.site.max_depth);

    println!("\nOutput:");
    println!("  Cache: {}", config.output.cache_path);
    if config.crawler.debug_mode {
        println!("  Debug pages: {}", config.output.html_dir);
    }

    println!("\nPlan:");
    println!(
        "  URL structure: {}",
        stage(
            config.crawler.read_structure_cache,
            &config.crawler.cache_key,
            "traverse site map and classify",
        )
    );
    println!(
        "  Responses: {}",
        stage(
            config.crawler.read_response_cache,
            &config.crawler.url_cache_key,
            "fetch every content page",
        )
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: lists what the cache store holds
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Cache: {}\n", config.output.cache_path);

    let cache = SqliteCache::new(&config.output.cache_path)?;
    let entries = cache.entries()?;

    if entries.is_empty() {
        println!("No cache entries.");
        return Ok(());
    }

    println!("{:<32} {:<10} {:>12}  Written", "Key", "Slot", "Bytes");
    for entry in &entries {
        println!(
            "{:<32} {:<10} {:>12}  {}",
            entry.key,
            entry.slot,
            entry.bytes,
            entry.written_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!("\n{} entries", entries.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match crawl(config).await {
        Ok(report) => {
            if report.fetch_tasks > 0 && report.fetched == 0 {
                tracing::warn!("No pages could be fetched; cached an empty response list");
            }
            println!(
                "Discovered: {}  Fetched: {}/{}  Failed: {}",
                report.discovered_urls, report.fetched, report.fetch_tasks, report.failed
            );
            if report.pages_failed > 0 {
                tracing::warn!("{} debug pages could not be written", report.pages_failed);
            }
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
