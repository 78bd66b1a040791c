//! Scraper configuration.
//!
//! Every setting has a default, so the scraper runs with no config file at
//! all. A TOML or JSON file can override any subset, and a few environment
//! variables are applied on top.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scrapers::BrowserEngineConfig;

/// Listing the scraper starts from.
pub const DEFAULT_SEED_URL: &str = "https://www.othoba.com/smartphone?orderby=0&pagesize=40";

/// Where the CSV lands, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "datasets/othoba_products.csv";

/// Inclusive range of whole seconds, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range that never sleeps.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Pick a duration in `min..=max` seconds.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return Duration::from_secs(self.min);
        }
        Duration::from_secs(rand::rng().random_range(self.min..=self.max))
    }

    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.min > self.max {
            return Err(format!(
                "{}: min ({}) must not exceed max ({})",
                name, self.min, self.max
            ));
        }
        Ok(())
    }
}

fn default_seed_url() -> String {
    DEFAULT_SEED_URL.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_detail_timeout_secs() -> u64 {
    30
}

fn default_initial_wait() -> DelayRange {
    DelayRange::new(8, 12)
}

fn default_page_delay() -> DelayRange {
    DelayRange::new(3, 7)
}

fn default_true() -> bool {
    true
}

/// Top-level scraper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Listing page to start from.
    #[serde(default = "default_seed_url")]
    pub seed_url: String,

    /// CSV output file. Overwritten on every run.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Timeout for each detail page GET, in seconds.
    #[serde(default = "default_detail_timeout_secs")]
    pub detail_timeout_secs: u64,

    /// How long to wait for the first listing's pager to render.
    #[serde(default = "default_initial_wait")]
    pub initial_wait: DelayRange,

    /// Pause between listing pages.
    #[serde(default = "default_page_delay")]
    pub page_delay: DelayRange,

    /// Stop after this many listing pages. Unlimited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Abort the run when a required field is missing. When false the field
    /// is logged and left empty.
    #[serde(default = "default_true")]
    pub strict_fields: bool,

    /// Query parameters ignored when deciding whether a URL was visited.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_query_params: Vec<String>,

    /// User agent for detail page requests.
    /// - None: crate user agent
    /// - "impersonate": random real browser user agent
    /// - anything else: used verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub browser: BrowserEngineConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            seed_url: default_seed_url(),
            output_path: default_output_path(),
            detail_timeout_secs: default_detail_timeout_secs(),
            initial_wait: default_initial_wait(),
            page_delay: default_page_delay(),
            max_pages: None,
            strict_fields: true,
            ignore_query_params: Vec::new(),
            user_agent: None,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a file path.
    /// Format is chosen by extension: `.toml`, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        Self::parse(&contents, ext)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        let config: ScraperConfig = match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise defaults; env overrides applied.
    pub async fn load(path: Option<&Path>) -> Result<Self, String> {
        let config = match path {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        // OTHOBA_SEED_URL - alternate listing (another category or sort order)
        if let Ok(url) = env::var("OTHOBA_SEED_URL") {
            if !url.trim().is_empty() {
                self.seed_url = url.trim().to_string();
            }
        }

        // OTHOBA_OUTPUT - CSV destination
        if let Ok(path) = env::var("OTHOBA_OUTPUT") {
            if !path.is_empty() {
                self.output_path = PathBuf::from(path);
            }
        }

        self.browser = self.browser.with_env_overrides();
        self
    }

    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.seed_url)
            .map_err(|e| format!("seed_url '{}' is not a valid URL: {}", self.seed_url, e))?;
        self.initial_wait.validate("initial_wait")?;
        self.page_delay.validate("page_delay")?;
        if self.detail_timeout_secs == 0 {
            return Err("detail_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}
