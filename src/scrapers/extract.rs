//! Listing tile and detail page extraction.

use scraper::ElementRef;
use tracing::warn;

use super::error::{Result, ScrapeError};
use super::layout::{CompiledRule, Layout, Normalize, Presence, Region};
use super::page::{element_text, RenderedPage};
use super::pagination::find_next_page;
use crate::models::{Field, ProductRecord};
use crate::utils::{clean_text, extract_number, word_chars};

/// What a listing page yields: its tiles and where to go next.
///
/// Each tile is parsed on its own, so a malformed tile only fails when the
/// crawl reaches it. The next-page lookup is likewise kept as a result and
/// consulted after the tiles are processed.
#[derive(Debug)]
pub struct ListingPage {
    pub tiles: Vec<Result<Tile>>,
    pub next_page: Result<Option<String>>,
}

/// A product as seen on the listing, before its detail page is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub link: String,
    pub title: String,
    /// Tile-region field values, already normalized.
    pub values: Vec<(Field, Option<String>)>,
}

/// Result of parsing one detail page.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Record(ProductRecord),
    /// The page has no specification list; the product is skipped.
    NoSpecifications,
}

/// Extract tiles and the next-page link from a rendered listing.
pub fn parse_listing(page: &RenderedPage, layout: &Layout, strict: bool) -> ListingPage {
    let tiles = page
        .find_all(&layout.tile)
        .map(|tile| parse_tile(page, tile, layout, strict))
        .collect();

    ListingPage {
        tiles,
        next_page: find_next_page(page, layout),
    }
}

fn parse_tile(
    page: &RenderedPage,
    tile: ElementRef<'_>,
    layout: &Layout,
    strict: bool,
) -> Result<Tile> {
    let missing = |field| ScrapeError::FieldMissing {
        field,
        url: page.url().to_string(),
    };

    let href = tile
        .select(&layout.product_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| missing(Field::ProductDetailsLink))?;
    let link = page.resolve(href.trim())?;

    let title = tile
        .select(&layout.product_name)
        .next()
        .map(|name| element_text(name).trim().to_string())
        .ok_or_else(|| missing(Field::ProductTitle))?;

    let values = layout
        .rules_for(Region::Tile)
        .map(|rule| Ok((rule.rule.field, extract_field(tile, rule, page.url(), strict)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Tile {
        link,
        title,
        values,
    })
}

/// Build a record from a tile and the HTML of its detail page.
pub fn parse_detail(tile: Tile, html: &str, layout: &Layout, strict: bool) -> Result<DetailOutcome> {
    let page = RenderedPage::parse(&tile.link, html);

    if page.find(&layout.spec_items).is_none() {
        return Ok(DetailOutcome::NoSpecifications);
    }

    let mut record = ProductRecord::new(tile.link, tile.title);
    for (field, value) in tile.values {
        record.set(field, value);
    }

    for rule in layout.rules_for(Region::Detail) {
        let value = extract_field(page.root(), rule, page.url(), strict)?;
        record.set(rule.rule.field, value);
    }

    Ok(DetailOutcome::Record(record))
}

/// Look up one field under `scope` and normalize it.
///
/// A missing optional element yields `None`. A missing required element is a
/// [`ScrapeError::FieldMissing`] when `strict`, otherwise a warning and `None`.
fn extract_field(
    scope: ElementRef<'_>,
    rule: &CompiledRule,
    url: &str,
    strict: bool,
) -> Result<Option<String>> {
    let Some(element) = scope.select(&rule.selector).next() else {
        return match rule.rule.presence {
            Presence::Optional => Ok(None),
            Presence::Required if strict => Err(ScrapeError::FieldMissing {
                field: rule.rule.field,
                url: url.to_string(),
            }),
            Presence::Required => {
                warn!("Required field '{}' missing on {}", rule.rule.field, url);
                Ok(None)
            }
        };
    };

    let text = element_text(element);
    Ok(match rule.rule.normalize {
        Normalize::Trim => clean_text(&text),
        Normalize::WordChars => word_chars(&text),
        Normalize::Number => extract_number(Some(&text)),
    })
}
