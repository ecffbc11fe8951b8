//! News-Harvester main entry point
//!
//! This is the command-line interface for the News-Harvester article crawler.

use anyhow::Context;
use clap::Parser;
use news_harvester::config::{load_config_with_hash, validate, Config};
use news_harvester::crawler::Coordinator;
use news_harvester::output::{
    generate_markdown_summary, load_statistics, print_statistics, print_summary,
};
use news_harvester::storage::JsonFileStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// News-Harvester: a category-aware news article harvester
///
/// Discovers the portal's categories, walks every category's listing pages,
/// and stores each article as `{data-root-dir}/{category}/{md5(title)}.json`.
#[derive(Parser, Debug)]
#[command(name = "news-harvester")]
#[command(version)]
#[command(about = "A category-aware news article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Portal root URL to discover categories from
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory the per-category article directories are written to
    #[arg(long, value_name = "DIR")]
    data_root_dir: Option<PathBuf>,

    /// Write a markdown crawl summary to this file
    #[arg(long, value_name = "FILE")]
    summary_path: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the stored corpus and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, config_hash.as_deref());
        Ok(ExitCode::SUCCESS)
    } else if cli.stats {
        handle_stats(&config)?;
        Ok(ExitCode::SUCCESS)
    } else {
        handle_crawl(config, config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_harvester=info,warn"),
            1 => EnvFilter::new("news_harvester=debug,info"),
            2 => EnvFilter::new("news_harvester=trace,debug"),
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

/// Loads the config file if given, then applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }
    if let Some(data_root_dir) = &cli.data_root_dir {
        config.output.data_root_dir = data_root_dir.clone();
    }
    if let Some(summary_path) = &cli.summary_path {
        config.output.summary_path = Some(summary_path.clone());
    }

    validate(&config).context("invalid configuration")?;
    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, config_hash: Option<&str>) {
    println!("=== News-Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Expected categories: {}", config.crawler.expected_categories);

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent categories: {}",
        config.crawler.max_concurrent_categories
    );
    println!(
        "  Max concurrent articles: {}",
        config.crawler.max_concurrent_articles
    );
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.fetch.max_retries, config.fetch.retry_delay_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Data root: {}", config.output.data_root_dir.display());
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path.display());
    }
    if let Some(hash) = config_hash {
        println!("  Config hash: {}", hash);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the stored corpus
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data root: {}\n", config.output.data_root_dir.display());

    let store = JsonFileStore::new(&config.output.data_root_dir);
    let stats = load_statistics(&store, config.crawler.expected_categories)
        .context("failed to read corpus")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: Option<String>) -> anyhow::Result<ExitCode> {
    tracing::info!(
        "Starting crawl of {} into {}",
        config.site.base_url,
        config.output.data_root_dir.display()
    );

    let summary_path = config.output.summary_path.clone();
    let mut coordinator = Coordinator::new(config)?;
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling crawl");
            cancel.cancel();
        }
    });

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&report.summary);

    if let Some(path) = summary_path {
        generate_markdown_summary(&report.summary, &path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    if report.is_success() {
        tracing::info!("Crawl completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(
            "Crawl incomplete: {} categories failed",
            report.summary.category_failures.len()
        );
        Ok(ExitCode::FAILURE)
    }
}
