//! Listing traversal and product extraction for othoba.com.

pub mod browser;
mod error;
pub mod extract;
mod http_client;
pub mod layout;
mod othoba;
pub mod page;
pub mod pagination;

pub use browser::{BrowserEngineConfig, BrowserSession, PageDriver};
pub use error::{Result, ScrapeError};
pub use http_client::{DetailFetcher, HttpClient};
pub use othoba::{CrawlSummary, OthobaScraper, ScrapeOptions};
