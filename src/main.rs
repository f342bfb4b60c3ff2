//! Site-Archiver main entry point
//!
//! This is the command-line interface for the Site-Archiver website archiver.

use anyhow::Context;
use clap::Parser;
use site_archiver::config::{load_config_with_fingerprint, Config, CrawlConfig};
use site_archiver::crawler::Crawler;
use site_archiver::output::{load_statistics, print_report, print_statistics};
use site_archiver::storage::open_archive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Site-Archiver: a polite website archiver
///
/// Site-Archiver follows links from a seed URL up to a maximum depth and page
/// budget, respects the site's robots.txt, and stores the visible text of every
/// page together with the link graph in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "site-archiver")]
#[command(version = "1.0.0")]
#[command(about = "A polite website archiver", long_about = None)]
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

    /// Empty the archive before crawling
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fresh"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, fingerprint) = load_config_with_fingerprint(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (sha256: {})", fingerprint);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_archiver=info,warn"),
            1 => EnvFilter::new("site_archiver=debug,info"),
            2 => EnvFilter::new("site_archiver=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    let crawl = CrawlConfig::from_config(config);

    println!("=== Site-Archiver Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", crawl.seed);
    println!("  Max depth: {}", crawl.max_depth);
    if crawl.max_pages == 0 {
        println!("  Max pages: unlimited");
    } else {
        println!("  Max pages: {}", crawl.max_pages);
    }
    println!("  Workers: {}", crawl.workers);
    println!("  Exclude external links: {}", crawl.exclude_external_links);
    println!("  Request timeout: {:?}", crawl.request_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let archive = open_archive(Path::new(&config.output.database_path))
        .context("Failed to open archive database")?;

    let stats = archive
        .with_store(|store| load_statistics(store))
        .context("Failed to load statistics")?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    let archive = open_archive(Path::new(&config.output.database_path))
        .context("Failed to open archive database")?;

    if fresh {
        tracing::info!("Clearing archive before a fresh crawl");
        archive.clear_all().context("Failed to clear archive")?;
    }

    let crawler = Crawler::new(CrawlConfig::from_config(&config), Arc::new(archive));

    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let report = crawler.run().await.context("Crawl failed")?;
    print_report(&report);

    Ok(())
}
