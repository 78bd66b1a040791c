//! Data models for the product scraper.

mod product;
mod visited;

pub use product::{Field, ProductRecord};
pub use visited::VisitedSet;
