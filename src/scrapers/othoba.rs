//! Paginated smartphone listing scraper for othoba.com.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::browser::PageDriver;
use super::error::{Result, ScrapeError};
use super::extract::{parse_detail, parse_listing, DetailOutcome, Tile};
use super::http_client::DetailFetcher;
use super::layout::{self, Layout};
use super::page::RenderedPage;
use crate::config::{DelayRange, ScraperConfig};
use crate::models::{ProductRecord, VisitedSet};

/// Run settings the scraper needs, taken from [`ScraperConfig`].
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub seed_url: String,
    pub initial_wait: DelayRange,
    pub page_delay: DelayRange,
    pub max_pages: Option<usize>,
    pub strict_fields: bool,
    pub ignore_query_params: Vec<String>,
}

impl From<&ScraperConfig> for ScrapeOptions {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            seed_url: config.seed_url.clone(),
            initial_wait: config.initial_wait,
            page_delay: config.page_delay,
            max_pages: config.max_pages,
            strict_fields: config.strict_fields,
            ignore_query_params: config.ignore_query_params.clone(),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub tiles_seen: usize,
    pub tiles_already_visited: usize,
    pub skipped_no_specifications: usize,
    pub records_emitted: usize,
}

/// Walks the listing with a [`PageDriver`] and fetches each new product's
/// detail page with a [`DetailFetcher`].
pub struct OthobaScraper<D, F> {
    driver: D,
    fetcher: F,
    layout: Layout,
    options: ScrapeOptions,
    visited: VisitedSet,
    summary: CrawlSummary,
}

impl<D: PageDriver, F: DetailFetcher> OthobaScraper<D, F> {
    pub fn new(driver: D, fetcher: F, options: ScrapeOptions) -> Result<Self> {
        let visited = VisitedSet::with_ignored_params(options.ignore_query_params.iter().cloned());
        Ok(Self {
            driver,
            fetcher,
            layout: Layout::new()?,
            options,
            visited,
            summary: CrawlSummary::default(),
        })
    }

    /// Counters so far. Still meaningful after `scrape` returns an error.
    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Traverse the listing from the seed URL, sending one record per new
    /// product to `records`.
    ///
    /// Ends normally when the listing has no next page, when the next page
    /// was already visited, or when `max_pages` is reached.
    pub async fn scrape(&mut self, records: &mpsc::Sender<ProductRecord>) -> Result<CrawlSummary> {
        let seed = self.options.seed_url.clone();
        self.visited.insert(&seed);

        self.driver.navigate(&seed).await?;
        let wait = self.options.initial_wait.sample();
        if !self.driver.wait_for(layout::PAGINATION, wait).await? {
            return Err(ScrapeError::WaitTimeout {
                selector: layout::PAGINATION.to_string(),
                url: seed,
                secs: wait.as_secs(),
            });
        }

        let mut next_page = self.scrape_current_page(records).await?;

        loop {
            let Some(url) = next_page else {
                info!("Scraping completed: no next page");
                break;
            };
            info!("Next page: {}", url);

            if self
                .options
                .max_pages
                .is_some_and(|max| self.summary.pages_visited >= max)
            {
                info!("Reached page limit ({} pages)", self.summary.pages_visited);
                break;
            }

            if !self.visited.insert(&url) {
                info!("All listing pages visited");
                break;
            }

            self.driver.navigate(&url).await?;
            next_page = self.scrape_current_page(records).await?;

            tokio::time::sleep(self.options.page_delay.sample()).await;
        }

        info!(
            "Visited {} pages, emitted {} records ({} without specifications)",
            self.summary.pages_visited,
            self.summary.records_emitted,
            self.summary.skipped_no_specifications
        );

        Ok(self.summary.clone())
    }

    /// Close the browser session.
    pub async fn close(&mut self) {
        self.driver.close().await;
    }

    /// Extract every tile on the driver's current page. Returns the next
    /// page's URL, if the listing has one.
    async fn scrape_current_page(
        &mut self,
        records: &mpsc::Sender<ProductRecord>,
    ) -> Result<Option<String>> {
        let url = self.driver.current_url().await?;
        let source = self.driver.page_source().await?;

        let listing = {
            let page = RenderedPage::parse(&url, &source);
            parse_listing(&page, &self.layout, self.options.strict_fields)
        };

        self.summary.pages_visited += 1;
        debug!("{} tiles on {}", listing.tiles.len(), url);

        for tile in listing.tiles {
            self.scrape_tile(tile?, records).await?;
        }

        listing.next_page
    }

    async fn scrape_tile(&mut self, tile: Tile, records: &mpsc::Sender<ProductRecord>) -> Result<()> {
        self.summary.tiles_seen += 1;

        if !self.visited.insert(&tile.link) {
            self.summary.tiles_already_visited += 1;
            return Ok(());
        }

        let link = tile.link.clone();
        let html = self.fetcher.fetch(&link).await?;

        match parse_detail(tile, &html, &self.layout, self.options.strict_fields)? {
            DetailOutcome::NoSpecifications => {
                self.summary.skipped_no_specifications += 1;
                debug!("No specifications on {}, skipping", link);
            }
            DetailOutcome::Record(record) => {
                match serde_json::to_string(&record) {
                    Ok(json) => info!("Scraped {}", json),
                    Err(_) => info!("Scraped {:?}", record),
                }
                if records.send(record).await.is_ok() {
                    self.summary.records_emitted += 1;
                } else {
                    warn!("Record collector closed; dropping record for {}", link);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Serves listing pages from memory and records every navigation.
    struct FakeDriver {
        pages: HashMap<String, String>,
        current: Option<String>,
        navigations: Arc<Mutex<Vec<String>>>,
        has_pager: bool,
    }

    #[async_trait]
    impl PageDriver for FakeDriver {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.navigations.lock().unwrap().push(url.to_string());
            self.current = Some(url.to_string());
            Ok(())
        }

        async fn wait_for(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
            Ok(self.has_pager)
        }

        async fn page_source(&mut self) -> Result<String> {
            let url = self.current.clone().unwrap_or_default();
            Ok(self.pages.get(&url).cloned().unwrap_or_default())
        }

        async fn current_url(&mut self) -> Result<String> {
            Ok(self.current.clone().unwrap_or_default())
        }

        async fn close(&mut self) {}
    }

    struct FakeFetcher {
        pages: HashMap<String, String>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl DetailFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.fetched.lock().unwrap().push(url.to_string());
            Ok(self.pages.get(url).cloned().unwrap_or_default())
        }
    }

    const SEED: &str = "https://www.othoba.com/smartphone?orderby=0&pagesize=40";
    const PAGE_2: &str = "https://www.othoba.com/smartphone?pagenumber=2";

    fn tile(slug: &str) -> String {
        format!(
            r#"<div class="product product-image-gap product-simple">
                <h3 class="product-name"><a href="/{slug}">{slug}</a></h3>
                <span class="new-price dl-new-price-product">৳ 9,999</span>
            </div>"#
        )
    }

    fn listing(tiles: &[&str], active: &str, next: Option<&str>) -> String {
        let tiles: String = tiles.iter().map(|s| tile(s)).collect();
        let next = next
            .map(|href| format!(r#"<li class="page-item"><a href="{href}">next</a></li>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body>{tiles}<ul class="pagination">
                <li class="page-item active"><a href="{active}">1</a></li>{next}
            </ul></body></html>"#
        )
    }

    fn detail() -> String {
        r#"<html><body>
            <form id="product-details-form"><div>
                <div><div><div></div><div><div></div>
                    <div><span>Brand</span><span><a>Xiaomi</a></span></div>
                    <div><span>Seller</span><span><a>Phone Bazar</a></span></div>
                </div></div></div>
                <div></div>
                <div><a>(3 Reviews)</a></div>
            </div></form>
            <div class="sold-info seller-statting"><p>Rating</p><p>80%</p></div>
            <div class="sold-info seller-ship"><p>Ship</p><p>90%</p></div>
            <div id="product-tab-specification"><ul>
                <li><p>Black</p></li><li><p>6 GB</p></li>
            </ul></div>
        </body></html>"#
            .to_string()
    }

    struct Harness {
        scraper: OthobaScraper<FakeDriver, FakeFetcher>,
        navigations: Arc<Mutex<Vec<String>>>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    fn harness(listings: Vec<(&str, String)>, details: Vec<(&str, String)>) -> Harness {
        let navigations = Arc::new(Mutex::new(Vec::new()));
        let fetched = Arc::new(Mutex::new(Vec::new()));
        let driver = FakeDriver {
            pages: listings.into_iter().map(|(u, h)| (u.to_string(), h)).collect(),
            current: None,
            navigations: navigations.clone(),
            has_pager: true,
        };
        let fetcher = FakeFetcher {
            pages: details.into_iter().map(|(u, h)| (u.to_string(), h)).collect(),
            fetched: fetched.clone(),
        };
        let options = ScrapeOptions {
            seed_url: SEED.to_string(),
            initial_wait: DelayRange::none(),
            page_delay: DelayRange::none(),
            max_pages: None,
            strict_fields: true,
            ignore_query_params: Vec::new(),
        };
        Harness {
            scraper: OthobaScraper::new(driver, fetcher, options).unwrap(),
            navigations,
            fetched,
        }
    }

    async fn run(scraper: &mut OthobaScraper<FakeDriver, FakeFetcher>) -> (Result<CrawlSummary>, Vec<ProductRecord>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = scraper.scrape(&tx).await;
        drop(tx);
        let mut records = Vec::new();
        while let Some(r) = rx.recv().await {
            records.push(r);
        }
        (result, records)
    }

    #[tokio::test]
    async fn test_follows_pages_until_no_next() {
        let mut h = harness(
            vec![
                (SEED, listing(&["a", "b"], SEED, Some(PAGE_2))),
                (PAGE_2, listing(&["c"], PAGE_2, None)),
            ],
            vec![
                ("https://www.othoba.com/a", detail()),
                ("https://www.othoba.com/b", detail()),
                ("https://www.othoba.com/c", detail()),
            ],
        );

        let (result, records) = run(&mut h.scraper).await;
        let summary = result.unwrap();

        assert_eq!(summary.pages_visited, 2);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].product_details_link, "https://www.othoba.com/c");
        assert_eq!(records[0].brand_name.as_deref(), Some("Xiaomi"));
        assert_eq!(records[0].ram.as_deref(), Some("6 GB"));
        assert_eq!(*h.navigations.lock().unwrap(), vec![SEED, PAGE_2]);
    }

    #[tokio::test]
    async fn test_repeated_page_stops_traversal() {
        // Page 2 claims page 1 comes next
        let mut h = harness(
            vec![
                (SEED, listing(&["a"], SEED, Some(PAGE_2))),
                (PAGE_2, listing(&["b"], PAGE_2, Some(SEED))),
            ],
            vec![
                ("https://www.othoba.com/a", detail()),
                ("https://www.othoba.com/b", detail()),
            ],
        );

        let (result, records) = run(&mut h.scraper).await;

        assert_eq!(result.unwrap().pages_visited, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(h.navigations.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_tiles_fetched_once() {
        let mut h = harness(
            vec![
                (SEED, listing(&["a", "a"], SEED, Some(PAGE_2))),
                (PAGE_2, listing(&["a", "b"], PAGE_2, None)),
            ],
            vec![
                ("https://www.othoba.com/a", detail()),
                ("https://www.othoba.com/b", detail()),
            ],
        );

        let (result, records) = run(&mut h.scraper).await;
        let summary = result.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(summary.tiles_seen, 4);
        assert_eq!(summary.tiles_already_visited, 2);
        assert_eq!(
            *h.fetched.lock().unwrap(),
            vec!["https://www.othoba.com/a", "https://www.othoba.com/b"]
        );
    }

    #[tokio::test]
    async fn test_page_limit() {
        let mut h = harness(
            vec![
                (SEED, listing(&["a"], SEED, Some(PAGE_2))),
                (PAGE_2, listing(&["b"], PAGE_2, None)),
            ],
            vec![("https://www.othoba.com/a", detail())],
        );
        h.scraper.options.max_pages = Some(1);

        let (result, records) = run(&mut h.scraper).await;

        assert_eq!(result.unwrap().pages_visited, 1);
        assert_eq!(records.len(), 1);
        assert!(!h.scraper.visited().contains(PAGE_2));
    }

    #[tokio::test]
    async fn test_missing_pager_times_out() {
        let mut h = harness(vec![(SEED, listing(&["a"], SEED, None))], vec![]);
        h.scraper.driver.has_pager = false;

        let (result, records) = run(&mut h.scraper).await;

        assert!(matches!(result, Err(ScrapeError::WaitTimeout { .. })));
        assert!(records.is_empty());
        assert!(h.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_layout_break_keeps_earlier_records() {
        let broken = detail().replace(r#"<div class="sold-info seller-ship"><p>Ship</p><p>90%</p></div>"#, "");
        let mut h = harness(
            vec![(SEED, listing(&["a", "b", "c"], SEED, None))],
            vec![
                ("https://www.othoba.com/a", detail()),
                ("https://www.othoba.com/b", broken),
                ("https://www.othoba.com/c", detail()),
            ],
        );

        let (result, records) = run(&mut h.scraper).await;

        let err = result.unwrap_err();
        assert!(err.is_layout());
        assert_eq!(records.len(), 1);
        assert_eq!(h.scraper.summary().records_emitted, 1);
        assert_eq!(h.fetched.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tile_failure_keeps_records_before_it() {
        let bad_tile = r#"<div class="product product-image-gap product-simple">
                <h3 class="product-name">Listing glitch</h3>
            </div>"#;
        let html = listing(&["a"], SEED, Some(PAGE_2)).replace(
            r#"<ul class="pagination">"#,
            &format!(r#"{bad_tile}<ul class="pagination">"#),
        );
        let mut h = harness(
            vec![(SEED, html)],
            vec![("https://www.othoba.com/a", detail())],
        );

        let (result, records) = run(&mut h.scraper).await;

        assert!(matches!(
            result,
            Err(ScrapeError::FieldMissing {
                field: crate::models::Field::ProductDetailsLink,
                ..
            })
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_details_link, "https://www.othoba.com/a");
        assert_eq!(*h.navigations.lock().unwrap(), vec![SEED]);
    }

    #[tokio::test]
    async fn test_closed_collector_is_not_counted() {
        let mut h = harness(
            vec![(SEED, listing(&["a"], SEED, None))],
            vec![("https://www.othoba.com/a", detail())],
        );
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let summary = h.scraper.scrape(&tx).await.unwrap();

        assert_eq!(summary.tiles_seen, 1);
        assert_eq!(summary.records_emitted, 0);
    }
}
