//! Command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use othoba_scrape::config::ScraperConfig;
use othoba_scrape::runner::{self, CloseReason};
use othoba_scrape::scrapers::{BrowserSession, HttpClient, OthobaScraper, ScrapeOptions};

#[derive(Parser)]
#[command(name = "othoba")]
#[command(about = "Scrape othoba.com smartphone listings into a CSV file")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML or JSON)
    #[arg(long, env = "OTHOBA_CONFIG")]
    config: Option<PathBuf>,

    /// CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ScraperConfig::load(cli.config.as_deref())
        .await
        .map_err(anyhow::Error::msg)?;
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = Some(max_pages);
    }

    info!("Starting at {}", config.seed_url);

    let fetcher = HttpClient::with_user_agent(config.detail_timeout(), config.user_agent.as_deref())?;
    let driver = BrowserSession::launch(config.browser.clone())
        .await
        .context("Failed to start browser session")?;
    let mut scraper = OthobaScraper::new(driver, fetcher, ScrapeOptions::from(&config))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let report = runner::run(&mut scraper, &config.output_path, shutdown).await?;
    let summary = &report.summary;

    info!(
        "Session {}: {} pages, {} products seen, {} without specifications, {} rows in {}",
        report.reason,
        summary.pages_visited,
        summary.tiles_seen,
        summary.skipped_no_specifications,
        report.rows,
        report.output.display()
    );

    match report.reason {
        CloseReason::Failed(e) => {
            if e.is_layout() {
                warn!("The page layout may have changed; set strict_fields = false to keep going past missing fields");
            }
            Err(e.into())
        }
        CloseReason::Finished | CloseReason::Interrupted => Ok(()),
    }
}
