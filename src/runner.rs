//! One scraping session: crawl, collect records, write the CSV.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::export::write_csv;
use crate::models::ProductRecord;
use crate::scrapers::{CrawlSummary, DetailFetcher, OthobaScraper, PageDriver, ScrapeError};

const RECORD_BUFFER: usize = 256;

/// Why a session ended.
#[derive(Debug)]
pub enum CloseReason {
    /// Traversal ran out of pages.
    Finished,
    /// The shutdown signal fired first.
    Interrupted,
    /// The crawl stopped on an error.
    Failed(ScrapeError),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished => write!(f, "finished"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub reason: CloseReason,
    pub summary: CrawlSummary,
    pub rows: usize,
    pub output: PathBuf,
}

/// Run `scraper` until it finishes, fails, or `shutdown` resolves.
///
/// Records are collected as they arrive and written to `output` however the
/// crawl ends, so a failure late in a run keeps everything scraped before it.
/// Only a failure to write the file is returned as `Err`.
pub async fn run<D, F>(
    scraper: &mut OthobaScraper<D, F>,
    output: &Path,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<RunReport>
where
    D: PageDriver,
    F: DetailFetcher,
{
    let (tx, mut rx) = mpsc::channel::<ProductRecord>(RECORD_BUFFER);

    let crawl = async {
        let reason = tokio::select! {
            biased;
            _ = shutdown => {
                info!("Shutdown requested, stopping crawl");
                CloseReason::Interrupted
            }
            result = scraper.scrape(&tx) => match result {
                Ok(_) => CloseReason::Finished,
                Err(e) => CloseReason::Failed(e),
            },
        };
        drop(tx);
        reason
    };

    let collect = async {
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        records
    };

    let (reason, records) = tokio::join!(crawl, collect);

    scraper.close().await;

    if let CloseReason::Failed(e) = &reason {
        warn!("Crawl stopped early: {}", e);
    }

    let rows = write_csv(output, &records)?;
    info!("Wrote {} rows to {}", rows, output.display());

    Ok(RunReport {
        reason,
        summary: scraper.summary().clone(),
        rows,
        output: output.to_path_buf(),
    })
}
