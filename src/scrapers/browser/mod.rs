//! Browser-driven navigation for JS-rendered listing pages.
//!
//! The scraper only needs a small slice of a browser: go to a URL, wait for
//! an element to appear, and read back the rendered DOM. [`PageDriver`]
//! captures that slice; [`BrowserSession`] implements it over chromiumoxide
//! (CDP) with a single tab reused for every navigation.

mod config;
#[cfg(feature = "browser")]
mod session;

pub use config::{default_headless, default_timeout, BrowserEngineConfig};

use std::time::Duration;

use async_trait::async_trait;

use super::error::Result;
#[cfg(not(feature = "browser"))]
use super::error::ScrapeError;

/// Navigation capability the pagination loop runs against.
#[async_trait]
pub trait PageDriver: Send {
    /// Load a URL in the session's tab.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Poll until `selector` matches an element or `timeout` elapses.
    /// Returns false on timeout.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Serialized DOM of the current page, after scripts have run.
    async fn page_source(&mut self) -> Result<String>;

    /// URL of the current page, after redirects.
    async fn current_url(&mut self) -> Result<String>;

    /// Tear the session down. Safe to call more than once.
    async fn close(&mut self);
}

#[cfg(feature = "browser")]
pub use session::BrowserSession;

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn launch(_config: BrowserEngineConfig) -> Result<Self> {
        Err(ScrapeError::Browser(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Err(ScrapeError::Browser("browser feature disabled".to_string()))
    }

    async fn wait_for(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }

    async fn page_source(&mut self) -> Result<String> {
        Err(ScrapeError::Browser("browser feature disabled".to_string()))
    }

    async fn current_url(&mut self) -> Result<String> {
        Err(ScrapeError::Browser("browser feature disabled".to_string()))
    }

    async fn close(&mut self) {}
}

/// How often [`PageDriver::wait_for`] re-checks the page.
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);
