//! othoba-scrape - smartphone listing scraper for othoba.com.
//!
//! Walks the paginated smartphone listing in a browser session, fetches each
//! product's detail page over HTTP, and writes one CSV row per product.

pub mod config;
pub mod export;
pub mod models;
pub mod runner;
pub mod scrapers;
pub mod utils;
