//! Link-Ledger main entry point
//!
//! This is the command-line interface for the Link-Ledger broken link checker.

use anyhow::Context;
use clap::Parser;
use link_ledger::config::{load_config_or_default, Config, DEFAULT_CONFIG_PATH};
use link_ledger::report::RunSummary;
use link_ledger::sheets::{MemorySheetStore, ERRORS_RANGE, PAGES_RANGE, SUMMARY_RANGE};
use link_ledger::Runner;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Link-Ledger: a broken link checker for one site
///
/// Crawls the configured site, checks every link it finds and records
/// broken links, per-page counts and a run summary in a Google Sheets
/// workbook.
#[derive(Parser, Debug)]
#[command(name = "link-ledger")]
#[command(version)]
#[command(about = "A broken link checker that reports into Google Sheets", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if the default file is absent)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl and report into an in-memory sheet instead of the real workbook
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let explicit = cli.config.is_some();
    let path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (config, hash) = load_config_or_default(&path, explicit)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    match hash {
        Some(hash) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        None => tracing::info!("No {} found, using built-in defaults", path.display()),
    }

    tracing::info!("Broken Link Checker for {}", config.site.label_prefix);

    if cli.dry_run {
        handle_dry_run(config).await
    } else {
        handle_run(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("link_ledger=info,warn"),
                1 => EnvFilter::new("link_ledger=debug,info"),
                2 => EnvFilter::new("link_ledger=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs against the configured workbook
async fn handle_run(config: Config) -> anyhow::Result<()> {
    let runner = Runner::new(config);
    tracing::info!(
        "Started at: {}",
        link_ledger::report::format_timestamp(&runner.started_at())
    );

    let summary = runner.run().await?;
    log_summary(&summary);
    Ok(())
}

/// Handles --dry-run: the full pipeline against an in-memory sheet
async fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Link-Ledger Dry Run ===\n");
    println!("Site: {}", config.site.root_url);
    println!("Spreadsheet: {} (not written)", config.sheet.spreadsheet_id);
    println!("Filter level: {}", config.crawler.filter_level);
    println!(
        "Excluded keywords: {}",
        config.crawler.excluded_keywords.join(", ")
    );
    println!(
        "Excluded schemes: {}\n",
        config.crawler.excluded_schemes.join(", ")
    );

    let store = Arc::new(MemorySheetStore::new());
    let mut runner = Runner::new(config);
    let summary = runner.run_with_store(store.clone()).await?;

    println!("\nRows that would have been written:");
    println!("  {}: {} rows", ERRORS_RANGE, store.appended(ERRORS_RANGE).len());
    println!("  {}: {} rows", PAGES_RANGE, store.appended(PAGES_RANGE).len());
    if let Some(rows) = store.last_update(SUMMARY_RANGE) {
        let cells: Vec<String> = rows
            .first()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default();
        println!("  {}: [{}]", SUMMARY_RANGE, cells.join(", "));
    }

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "Pages: {} ({} with errors) | Links: {} | OK: {} | Broken: {} | Skipped: {}",
        summary.pages_checked,
        summary.pages_with_errors,
        summary.links_total,
        summary.links_ok,
        summary.broken_links.len(),
        summary.skipped_links.len()
    );
}
