//! Product record model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named column of a scraped product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ProductDetailsLink,
    ProductTitle,
    Ram,
    Storage,
    Display,
    PhoneColor,
    OperatingSystem,
    CurrentPrice,
    OldPrice,
    TotalReviews,
    BrandName,
    Seller,
    SellerRating,
    ShipOnTime,
}

impl Field {
    /// Every field, in output column order.
    pub const ALL: [Field; 14] = [
        Field::ProductDetailsLink,
        Field::ProductTitle,
        Field::Ram,
        Field::Storage,
        Field::Display,
        Field::PhoneColor,
        Field::OperatingSystem,
        Field::CurrentPrice,
        Field::OldPrice,
        Field::TotalReviews,
        Field::BrandName,
        Field::Seller,
        Field::SellerRating,
        Field::ShipOnTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductDetailsLink => "product_details_link",
            Self::ProductTitle => "product_title",
            Self::Ram => "ram",
            Self::Storage => "storage",
            Self::Display => "display",
            Self::PhoneColor => "phone_color",
            Self::OperatingSystem => "operating_system",
            Self::CurrentPrice => "current_price",
            Self::OldPrice => "old_price",
            Self::TotalReviews => "total_reviews",
            Self::BrandName => "brand_name",
            Self::Seller => "seller",
            Self::SellerRating => "seller_rating",
            Self::ShipOnTime => "ship_on_time",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product as scraped from its listing tile and detail page.
///
/// Fields are declared in [`Field::ALL`] order, which is also the order of
/// the JSON log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_details_link: String,
    pub product_title: String,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub display: Option<String>,
    pub phone_color: Option<String>,
    pub operating_system: Option<String>,
    pub current_price: Option<String>,
    pub old_price: Option<String>,
    pub total_reviews: Option<String>,
    pub brand_name: Option<String>,
    pub seller: Option<String>,
    pub seller_rating: Option<String>,
    pub ship_on_time: Option<String>,
}

impl ProductRecord {
    /// Create a record with only the tile identity filled in.
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            product_details_link: link.into(),
            product_title: title.into(),
            ..Default::default()
        }
    }

    /// Look up a field value by name.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::ProductDetailsLink => Some(self.product_details_link.as_str()),
            Field::ProductTitle => Some(self.product_title.as_str()),
            Field::Ram => self.ram.as_deref(),
            Field::Storage => self.storage.as_deref(),
            Field::Display => self.display.as_deref(),
            Field::PhoneColor => self.phone_color.as_deref(),
            Field::OperatingSystem => self.operating_system.as_deref(),
            Field::CurrentPrice => self.current_price.as_deref(),
            Field::OldPrice => self.old_price.as_deref(),
            Field::TotalReviews => self.total_reviews.as_deref(),
            Field::BrandName => self.brand_name.as_deref(),
            Field::Seller => self.seller.as_deref(),
            Field::SellerRating => self.seller_rating.as_deref(),
            Field::ShipOnTime => self.ship_on_time.as_deref(),
        }
    }

    /// Set an optional field. The link and title are fixed at construction.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::ProductDetailsLink | Field::ProductTitle => return,
            Field::Ram => &mut self.ram,
            Field::Storage => &mut self.storage,
            Field::Display => &mut self.display,
            Field::PhoneColor => &mut self.phone_color,
            Field::OperatingSystem => &mut self.operating_system,
            Field::CurrentPrice => &mut self.current_price,
            Field::OldPrice => &mut self.old_price,
            Field::TotalReviews => &mut self.total_reviews,
            Field::BrandName => &mut self.brand_name,
            Field::Seller => &mut self.seller,
            Field::SellerRating => &mut self.seller_rating,
            Field::ShipOnTime => &mut self.ship_on_time,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert!("avg_rating".parse::<Field>().is_err());
    }

    #[test]
    fn test_get_identity_fields() {
        let record = ProductRecord::new("https://example.com/p", "Phone");
        assert_eq!(record.get(Field::ProductDetailsLink), Some("https://example.com/p"));
        assert_eq!(record.get(Field::ProductTitle), Some("Phone"));
        assert_eq!(record.get(Field::OldPrice), None);
    }

    #[test]
    fn test_set_ignores_identity_fields() {
        let mut record = ProductRecord::new("https://example.com/p", "Phone");
        record.set(Field::ProductTitle, Some("Other".to_string()));
        record.set(Field::Ram, Some("8 GB".to_string()));

        assert_eq!(record.get(Field::ProductTitle), Some("Phone"));
        assert_eq!(record.get(Field::Ram), Some("8 GB"));
        assert_eq!(record.get(Field::Storage), None);
    }
}
