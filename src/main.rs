//! Vitae main entry point
//!
//! This is the command-line interface for the vitae crawl-and-extract
//! engine.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitae::browser::{ChromeBrowser, ChromePage, SessionManager};
use vitae::config::{load_config_with_hash, Config};
use vitae::crawler::Orchestrator;
use vitae::extract::{ApiClient, ExtractOptions, Pipeline};
use vitae::storage::{open_store, Store};

/// Vitae: a resilient profile crawl-and-extract engine
///
/// Vitae drains a persistent frontier of profile URLs, extracting person
/// and organization records through an API-first pipeline with a
/// browser-scraping fallback.
#[derive(Parser, Debug)]
#[command(name = "vitae")]
#[command(version = "1.0.0")]
#[command(about = "A resilient profile crawl-and-extract engine", long_about = None)]
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

    /// Extract a single URL and print the result as JSON
    #[arg(long, value_name = "URL", conflicts_with_all = ["crawl", "stats"])]
    request: Option<String>,

    /// Skip the API and scrape the profile directly (with --request)
    #[arg(long, requires = "request")]
    force_scrape: bool,

    /// Do not nest the current employer's organization (with --request)
    #[arg(long, requires = "request")]
    skip_organization: bool,

    /// Drain the frontier queue continuously
    #[arg(long, conflicts_with_all = ["request", "stats"])]
    crawl: bool,

    /// Seed URL(s) to add to the frontier before crawling
    #[arg(long, value_name = "URL", requires = "crawl")]
    seed: Vec<String>,

    /// Show frontier and record counts and exit
    #[arg(long, conflicts_with_all = ["request", "crawl"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(url) = &cli.request {
        let options = ExtractOptions {
            force_scrape: cli.force_scrape,
            skip_organization: cli.skip_organization,
        };
        handle_request(&config, url, &options).await?;
    } else if cli.crawl {
        handle_crawl(config, &cli.seed).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        tracing::error!("Nothing to do: pass --request, --crawl or --stats");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vitae=info,warn"),
            1 => EnvFilter::new("vitae=debug,info"),
            2 => EnvFilter::new("vitae=trace,debug"),
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

/// Builds a pipeline over an already-launched browser page
///
/// The caller keeps the browser alive for the pipeline's lifetime, so the
/// Chrome child process is torn down when the mode handler returns.
fn build_pipeline<'a>(
    config: &Config,
    page: &'a ChromePage,
) -> Result<Pipeline<'a>, Box<dyn std::error::Error>> {
    let session = SessionManager::new(&config.browser, config.credentials.clone())?;
    session.apply_cookies(page)?;

    let api = match &config.api {
        Some(api_config) => Some(ApiClient::new(api_config)?),
        None => None,
    };

    Ok(Pipeline::new(
        page,
        config.navigation.clone(),
        session,
        api,
    ))
}

/// Handles --request: one extraction, envelope printed to stdout
async fn handle_request(
    config: &Config,
    url: &str,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let browser = ChromeBrowser::launch(&config.browser)?;
    let page = browser.new_page()?;
    let mut pipeline = build_pipeline(config, &page)?;
    let outcome = pipeline.handle_request(url, options).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Handles --crawl: seeds the frontier and drains it
async fn handle_crawl(config: Config, seeds: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(std::path::Path::new(&config.storage.database_path))?;
    let browser = ChromeBrowser::launch(&config.browser)?;
    let page = browser.new_page()?;
    let pipeline = build_pipeline(&config, &page)?;
    let mut orchestrator = Orchestrator::new(pipeline, store, config.pacing.clone());

    for seed in seeds {
        if orchestrator.seed(seed)? {
            tracing::info!("Seeded frontier with {}", seed);
        } else {
            tracing::info!("Seed {} already known", seed);
        }
    }

    match orchestrator.run().await {
        Ok(stats) => {
            tracing::info!(
                "Crawl complete: {} processed, {} profiles, {} organizations",
                stats.processed,
                stats.profiles,
                stats.organizations
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles --stats: prints counts from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(std::path::Path::new(&config.storage.database_path))?;
    let stats = store.stats()?;

    println!("Database: {}\n", config.storage.database_path);
    println!("Frontier queued:     {}", stats.queued);
    println!("Frontier processed:  {}", stats.processed);
    println!("Profiles stored:     {}", stats.profiles);
    println!("Organizations:       {}", stats.organizations);

    Ok(())
}
