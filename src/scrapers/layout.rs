//! Selectors and field rules for othoba.com's listing and detail markup.

use scraper::Selector;

use super::error::Result;
use super::page::parse_selector;
use crate::models::Field;

/// Present once the listing has rendered its pager.
pub const PAGINATION: &str = ".pagination";

/// One product tile on a listing page.
pub const PRODUCT_TILE: &str = ".product.product-image-gap.product-simple";

/// Tile element holding the product title.
pub const PRODUCT_NAME: &str = ".product-name";

/// Tile anchor pointing at the detail page.
pub const PRODUCT_LINK: &str = ".product-name a";

/// The anchor in the first page item after the active one.
pub const NEXT_PAGE: &str = "li.page-item.active ~ li > a";

/// Items of the specification list on a detail page.
pub const SPEC_ITEMS: &str = "#product-tab-specification > ul > li";

/// Whether a field's element must exist on a well-formed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// How raw element text becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Trim,
    WordChars,
    Number,
}

/// Where a field's element lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Inside the product's tile on the listing page.
    Tile,
    /// Anywhere on the product's detail page.
    Detail,
}

/// Lookup rule for one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub region: Region,
    pub selector: &'static str,
    pub presence: Presence,
    pub normalize: Normalize,
}

const fn rule(
    field: Field,
    region: Region,
    selector: &'static str,
    presence: Presence,
    normalize: Normalize,
) -> FieldRule {
    FieldRule {
        field,
        region,
        selector,
        presence,
        normalize,
    }
}

/// Value fields of a record. Link and title are resolved separately since a
/// tile without them cannot be visited at all.
///
/// Prices are read from the product's own tile, not the first price on the
/// listing page.
pub const FIELD_RULES: &[FieldRule] = &[
    rule(
        Field::Ram,
        Region::Detail,
        "#product-tab-specification > ul > li:nth-of-type(2) > p",
        Presence::Required,
        Normalize::WordChars,
    ),
    rule(
        Field::Storage,
        Region::Detail,
        "#product-tab-specification > ul > li:nth-of-type(3) > p",
        Presence::Optional,
        Normalize::Trim,
    ),
    rule(
        Field::Display,
        Region::Detail,
        "#product-tab-specification > ul > li:nth-of-type(4) > p",
        Presence::Optional,
        Normalize::Trim,
    ),
    rule(
        Field::PhoneColor,
        Region::Detail,
        "#product-tab-specification > ul > li:nth-of-type(1) > p",
        Presence::Optional,
        Normalize::Trim,
    ),
    rule(
        Field::OperatingSystem,
        Region::Detail,
        "#product-tab-specification > ul > li:nth-of-type(5) > p",
        Presence::Optional,
        Normalize::Trim,
    ),
    rule(
        Field::CurrentPrice,
        Region::Tile,
        ".new-price.dl-new-price-product",
        Presence::Optional,
        Normalize::Number,
    ),
    rule(
        Field::OldPrice,
        Region::Tile,
        ".old-price",
        Presence::Optional,
        Normalize::Number,
    ),
    rule(
        Field::TotalReviews,
        Region::Detail,
        "#product-details-form > div > div:nth-of-type(3) > a",
        Presence::Required,
        Normalize::Number,
    ),
    rule(
        Field::BrandName,
        Region::Detail,
        "#product-details-form > div > div:nth-of-type(1) > div > div:nth-of-type(2) \
         > div:nth-of-type(2) > span:nth-of-type(2) > a",
        Presence::Required,
        Normalize::Trim,
    ),
    rule(
        Field::Seller,
        Region::Detail,
        "#product-details-form > div > div:nth-of-type(1) > div > div:nth-of-type(2) \
         > div:nth-of-type(3) > span:nth-of-type(2) > a",
        Presence::Required,
        Normalize::Trim,
    ),
    rule(
        Field::SellerRating,
        Region::Detail,
        ".sold-info.seller-statting > p:nth-of-type(2)",
        Presence::Required,
        Normalize::Trim,
    ),
    rule(
        Field::ShipOnTime,
        Region::Detail,
        ".sold-info.seller-ship > p:nth-of-type(2)",
        Presence::Required,
        Normalize::Trim,
    ),
];

/// A [`FieldRule`] with its selector compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: FieldRule,
    pub selector: Selector,
}

/// Every selector the scraper needs, compiled once per run.
#[derive(Debug, Clone)]
pub struct Layout {
    pub tile: Selector,
    pub product_name: Selector,
    pub product_link: Selector,
    pub next_page: Selector,
    pub spec_items: Selector,
    pub rules: Vec<CompiledRule>,
}

impl Layout {
    pub fn new() -> Result<Self> {
        let rules = FIELD_RULES
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    rule: *rule,
                    selector: parse_selector(rule.selector)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tile: parse_selector(PRODUCT_TILE)?,
            product_name: parse_selector(PRODUCT_NAME)?,
            product_link: parse_selector(PRODUCT_LINK)?,
            next_page: parse_selector(NEXT_PAGE)?,
            spec_items: parse_selector(SPEC_ITEMS)?,
            rules,
        })
    }

    /// Rules evaluated against one region.
    pub fn rules_for(&self, region: Region) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter().filter(move |r| r.rule.region == region)
    }
}
