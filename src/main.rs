//! Hearth main entry point
//!
//! Command-line interface for the Hearth listing harvester.

use clap::Parser;
use hearth::checkpoint::CheckpointStore;
use hearth::config::load_config_with_hash;
use hearth::export::{print_checkpoint_summary, print_report, write_csv};
use hearth::harvest;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hearth: a resumable real-estate listing harvester
///
/// Hearth walks a paginated property catalog, extracts typed records from
/// the listing cards, enriches them from detail pages, and exports a CSV.
/// Progress is checkpointed after every page, so an interrupted run picks
/// up where it left off.
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(version = "0.1.0")]
#[command(about = "A resumable real-estate listing harvester", long_about = None)]
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

    /// Resume an interrupted run (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh run, discarding any existing checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export"])]
    dry_run: bool,

    /// Show a summary of the existing checkpoint and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    stats: bool,

    /// Re-export the CSV from the existing checkpoint and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export: bool,
}

/// Hard failure; nothing was exported beyond what prior runs produced
const EXIT_FAILURE: i32 = 1;
/// The run finished and exported, but some detail fetches failed
const EXIT_PARTIAL: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => (cfg, hash),
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let result = if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export {
        handle_export(&config)
    } else {
        handle_harvest(&config, &config_hash, cli.fresh).await
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hearth=info,warn"),
            1 => EnvFilter::new("hearth=debug,info"),
            2 => EnvFilter::new("hearth=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would run
fn handle_dry_run(config: &hearth::Config) -> hearth::Result<i32> {
    println!("=== Hearth Dry Run ===\n");

    println!("Catalog:");
    println!("  Start URL: {}", config.catalog.start_url);
    if config.catalog.max_pages > 0 {
        println!("  Page cap: {}", config.catalog.max_pages);
    } else {
        println!("  Page cap: none (walk to catalog end)");
    }

    println!("\nCrawler:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Page delay: {}ms (+ up to {}ms jitter)",
        config.crawler.page_delay_ms, config.crawler.jitter_ms);
    println!("  Detail delay: {}ms", config.crawler.detail_delay_ms);
    println!("  Retry limit: {} attempts, {}ms linear backoff",
        config.crawler.retry_limit, config.crawler.retry_backoff_ms);
    println!("  Checkpoint interval: every {} detail merges",
        config.crawler.checkpoint_interval);
    if config.crawler.skip_details {
        println!("  Detail enrichment: disabled");
    } else {
        println!("  Detail enrichment: up to {} concurrent fetches",
            config.crawler.max_concurrent_details);
    }

    println!("\nOutput:");
    println!("  Checkpoint: {}", config.output.checkpoint_path);
    println!("  CSV: {}", config.output.csv_path);

    let store = CheckpointStore::new(&config.output.checkpoint_path);
    match store.load()? {
        Some(checkpoint) => println!(
            "\n✓ Configuration is valid; would resume from page {} ({} records held)",
            checkpoint.last_page + 1,
            checkpoint.listings.len()
        ),
        None => println!("\n✓ Configuration is valid; would start from page 1"),
    }
    Ok(0)
}

/// Handles --stats: summarizes the existing checkpoint
fn handle_stats(config: &hearth::Config) -> hearth::Result<i32> {
    let store = CheckpointStore::new(&config.output.checkpoint_path);
    match store.load()? {
        Some(checkpoint) => {
            print_checkpoint_summary(&checkpoint);
            Ok(0)
        }
        None => {
            println!("No checkpoint at {}", config.output.checkpoint_path);
            Ok(EXIT_FAILURE)
        }
    }
}

/// Handles --export: rebuilds the CSV from the checkpoint without fetching
fn handle_export(config: &hearth::Config) -> hearth::Result<i32> {
    let store = CheckpointStore::new(&config.output.checkpoint_path);
    match store.load()? {
        Some(checkpoint) => {
            write_csv(&checkpoint.listings, &config.output.csv_path)?;
            println!(
                "✓ Exported {} records to {}",
                checkpoint.listings.len(),
                config.output.csv_path
            );
            Ok(0)
        }
        None => {
            println!("No checkpoint at {}", config.output.checkpoint_path);
            Ok(EXIT_FAILURE)
        }
    }
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &hearth::Config,
    config_hash: &str,
    fresh: bool,
) -> hearth::Result<i32> {
    if fresh {
        tracing::info!("Starting fresh run (discarding previous checkpoint)");
    } else {
        tracing::info!("Starting run (will resume if a checkpoint exists)");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; finishing the current page then stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = harvest(config, config_hash, fresh, shutdown_rx).await?;
    print_report(&report);

    if report.failed() {
        Ok(EXIT_FAILURE)
    } else if report.interrupted || report.details_failed() > 0 {
        Ok(EXIT_PARTIAL)
    } else {
        Ok(0)
    }
}
