//! Scraper error types.

use thiserror::Error;

use crate::models::Field;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Required field '{field}' missing on {url}")]
    FieldMissing { field: Field, url: String },
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Timed out after {secs}s waiting for '{selector}' on {url}")]
    WaitTimeout {
        selector: String,
        url: String,
        secs: u64,
    },
    #[error("Invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid selector: {0}")]
    Selector(String),
}

impl ScrapeError {
    /// True for failures caused by the page layout rather than the transport.
    pub fn is_layout(&self) -> bool {
        matches!(self, ScrapeError::FieldMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
