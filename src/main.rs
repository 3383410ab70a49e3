//! Discuit-Sweep main entry point
//!
//! This is the command-line interface for the Discuit-Sweep feed harvester.

use anyhow::Context;
use clap::Parser;
use discuit_sweep::config::{load_config_with_hash, Config};
use discuit_sweep::output::{print_statistics, report_context, write_outputs, ReportStats};
use discuit_sweep::{DiscuitClient, Harvester};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Discuit-Sweep: a window-bounded activity feed harvester
///
/// Discuit-Sweep walks a site's activity feed, collects every post and
/// comment inside a date window, rescans for posts bumped while it was
/// running, and writes a markdown report and a SQLite export.
#[derive(Parser, Debug)]
#[command(name = "discuit-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A window-bounded activity feed harvester", long_about = None)]
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

    /// Validate config and show the sweep parameters without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Print headline statistics to stdout after the sweep
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_sweep(config, cli.stats).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("discuit_sweep=info,warn"),
            1 => EnvFilter::new("discuit_sweep=debug,info"),
            2 => EnvFilter::new("discuit_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the sweep parameters
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let window = config.window.date_window()?;

    println!("=== Discuit-Sweep Dry Run ===\n");

    println!("Feed:");
    println!("  Base URL: {}", config.feed.base_url);
    println!("  Sort: {}", config.feed.sort);
    if let Some(community) = &config.feed.community_id {
        println!("  Community: {}", community);
    }
    if !config.feed.start_cursor.is_empty() {
        println!("  Start cursor: {}", config.feed.start_cursor);
    }
    println!("  Window: {}", window);

    println!("\nCrawler:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Redo batch size: {}", config.crawler.redo_batch_size);
    println!(
        "  Max rescan iterations: {}",
        config.crawler.max_rescan_iterations
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nReport:");
    println!("  Top N: {}", config.report.top_n);
    println!("  Ignored users: {}", config.report.ignored_users.len());

    println!("\nOutput:");
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main sweep: crawl, check, report
async fn handle_sweep(config: Config, show_stats: bool) -> anyhow::Result<()> {
    let mut harvester = Harvester::from_config(config.clone())?;

    let outcome = match harvester.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            return Err(e.into());
        }
    };
    if !outcome.rescan.converged {
        tracing::warn!("Report may miss activity from posts bumped during the final rescan");
    }

    let registered_users = fetch_registered_users(harvester.source()).await;
    let ctx = report_context(&config, registered_users)?;
    let store = harvester.into_store();

    let written = write_outputs(&store, &config, &ctx).context("Failed to write outputs")?;
    if written == 0 {
        tracing::warn!("No output destinations configured; nothing was written");
    }

    if show_stats {
        print_statistics(&ReportStats::from_store(&store), store.len());
    }

    tracing::info!("Sweep completed successfully with {} records", store.len());
    Ok(())
}

/// The account count is decoration for the report; a failure only drops it
async fn fetch_registered_users(client: &DiscuitClient) -> Option<u64> {
    match client.fetch_user_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Could not fetch registered user count: {}", e);
            None
        }
    }
}
