//! Plain HTTP fetching for product detail pages.
//!
//! Detail pages are server-rendered, so they bypass the browser session and
//! are fetched with a single GET each.

mod user_agent;

use user_agent::resolve_user_agent;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::error::{Result, ScrapeError};

/// Fetch capability for detail pages.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    /// GET `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed detail page fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the default user agent.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_user_agent(timeout, None)
    }

    /// Create a client with custom user agent configuration.
    /// - None: Use the crate's own user agent
    /// - Some("impersonate"): Use random real browser user agent
    /// - Some(custom): Use custom user agent string
    pub fn with_user_agent(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ScrapeError::Fetch {
                url: String::new(),
                source: e,
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DetailFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_err)?;
        let status = response.status();
        let body = response.text().await.map_err(fetch_err)?;

        // Error pages are returned as-is; they carry no specification block
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
        }

        debug!(
            "GET {} -> {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(body)
    }
}
