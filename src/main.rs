//! Sumula main entry point
//!
//! This is the command-line interface for the ogol.com.br match harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumula::config::{load_config_with_hash, Config};
use sumula::crawler::{listing_url, plan_tasks, run_crawl};
use sumula::output::{load_statistics, print_run_summary, print_statistics};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Sumula: a match-history harvester
///
/// Sumula walks each configured team's fixture listing year by year, follows
/// every match to its report for lineups and statistics, and stores the
/// result in SQLite. Blocking redirects trigger a global progressive pause.
#[derive(Parser, Debug)]
#[command(name = "sumula")]
#[command(version)]
#[command(about = "Harvests match history from ogol.com.br", long_about = None)]
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

    /// Validate config and show the request plan without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

/// Number of planned listing URLs shown by --dry-run
const DRY_RUN_PREVIEW: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumula=info,warn"),
            1 => EnvFilter::new("sumula=debug,info"),
            2 => EnvFilter::new("sumula=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the request plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Sumula Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler Configuration:");
    println!("  Teams: {}", crawler.teams.join(", "));
    println!("  Years: {}-{}", crawler.start_year, crawler.end_year);
    println!("  Pages: {:?}", crawler.pages);
    println!("  Rivalry only: {}", crawler.rivalry_only);
    println!("  Max concurrent requests: {}", crawler.max_concurrent_requests);
    println!(
        "  Minimum time between requests: {}ms",
        crawler.minimum_time_between_requests
    );
    println!("  Listing layout: {:?}", config.listing.layout);

    println!("\nBackoff:");
    println!(
        "  Pause: {}s per consecutive block, capped at {}s",
        config.backoff.base_interval, config.backoff.cap
    );
    println!("  Block statuses: {:?}", config.backoff.block_statuses);
    println!("  User agents in pool: {}", config.user_agent.pool.len());

    println!("\nStorage:");
    println!("  Backend: {:?}", config.storage.backend);
    println!("  Database: {}", config.storage.database_path);

    let base = Url::parse(&crawler.base_url)?;
    let tasks = plan_tasks(crawler);
    println!("\nRequest plan ({} listing pages):", tasks.len());
    for task in tasks.iter().take(DRY_RUN_PREVIEW) {
        println!("  - {}", listing_url(&base, task, crawler.end_year)?);
    }
    if tasks.len() > DRY_RUN_PREVIEW {
        println!("  ... and {} more", tasks.len() - DRY_RUN_PREVIEW);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let stats = load_statistics(Path::new(&config.storage.database_path))
        .with_context(|| format!("Cannot read {}", config.storage.database_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            interrupt.cancel();
        }
    });

    match run_crawl(config, config_hash, cancel).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
