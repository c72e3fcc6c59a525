//! Folio-Crawl main entry point
//!
//! This is the command-line interface for the Folio-Crawl site-to-document crawler.

use clap::Parser;
use folio_crawl::config::{load_config_with_hash, validate, Config, SinkConfig};
use folio_crawl::crawler::run_crawl;
use folio_crawl::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Folio-Crawl: a site-to-document crawler
///
/// Folio-Crawl walks every page under a base URL, extracts the text of each
/// page, renders it as a PDF and stores the document in the configured sink.
#[derive(Parser, Debug)]
#[command(name = "folio-crawl")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a site into PDF documents", long_about = None)]
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

    /// Override the configured base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(base_url) = cli.base_url {
        tracing::info!("Overriding base URL with {}", base_url);
        config.crawler.base_url = base_url;
        validate(&config)?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_crawl=info,warn"),
            1 => EnvFilter::new("folio_crawl=debug,info"),
            2 => EnvFilter::new("folio_crawl=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Folio-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages
    );
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Payload field: {}", config.crawler.payload_field);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nSink:");
    match &config.sink {
        SinkConfig::Filesystem { directory } => println!("  Filesystem: {}", directory),
        SinkConfig::AzureBlob {
            container_url,
            sas_token,
        } => {
            println!("  Azure Blob container: {}", container_url);
            println!(
                "  SAS token: {}",
                if sas_token.is_some() { "set" } else { "none" }
            );
        }
        SinkConfig::Memory => println!("  Memory (documents are discarded)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the normal crawl mode
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting crawl...");

    let report = run_crawl(config).await?;

    tracing::info!(
        "Crawl completed: {} stored, {} failed",
        report.visited,
        report.failed
    );
    print_report(&report);

    Ok(())
}
