//! Listing models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Categories a listing may belong to
pub const CATEGORIES: &[&str] = &[
    "electronics",
    "furniture",
    "clothing",
    "sports",
    "stationery",
    "home-appliances",
    "vehicles",
    "books",
    "other",
];

/// Listing model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Vec<String>,
    pub condition: ItemCondition,
    pub listing_type: ListingType,
    pub availability: Availability,
    pub price: Option<f64>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Physical condition of a listed item
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Acceptable,
    Poor,
}

/// How the owner wants to move the item
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_type", rename_all = "lowercase")]
pub enum ListingType {
    Sell,
    Lend,
    Exchange,
}

/// Listing availability
///
/// Only the transaction workflow writes Reserved and Sold; owners never set
/// availability directly.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_availability", rename_all = "lowercase")]
pub enum Availability {
    Available,
    Reserved,
    Sold,
}

/// Request DTO for creating a listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 100, message = "Title cannot be more than 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description cannot be more than 1000 characters"
    ))]
    pub description: String,
    #[validate(custom = "validate_categories")]
    pub category: Vec<String>,
    pub condition: ItemCondition,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(custom = "validate_tags")]
    pub tags: Vec<String>,
}

impl CreateListingRequest {
    /// Enforce the price rule: present and non-negative iff the listing sells
    pub fn validate_price(&self) -> Result<(), String> {
        validate_price_rule(self.listing_type, self.price)
    }
}

/// Request DTO for updating a listing
///
/// Only these fields are mutable. Owner, id, availability, and timestamps are
/// never client-writable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 100, message = "Title cannot be more than 100 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description cannot be more than 1000 characters"
    ))]
    pub description: Option<String>,
    #[validate(custom = "validate_categories")]
    pub category: Option<Vec<String>>,
    pub condition: Option<ItemCondition>,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    #[serde(default, with = "double_option")]
    pub price: Option<Option<f64>>,
    pub images: Option<Vec<String>>,
    #[validate(custom = "validate_tags")]
    pub tags: Option<Vec<String>>,
}

/// Distinguishes "price absent from payload" from "price: null"
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}

/// Sort orders for listing search
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Query parameters for listing search
#[derive(Debug, Deserialize, Default)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub condition: Option<ItemCondition>,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub availability: Option<Availability>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sort: Option<ListingSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn validate_categories(categories: &Vec<String>) -> Result<(), ValidationError> {
    if categories.is_empty() {
        return Err(ValidationError::new("category_required"));
    }
    for c in categories {
        if !CATEGORIES.contains(&c.as_str()) {
            return Err(ValidationError::new("unknown_category"));
        }
    }
    Ok(())
}

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    for t in tags {
        if t.is_empty() || t.len() > 20 {
            return Err(ValidationError::new("invalid_tag"));
        }
    }
    Ok(())
}

/// Price must be present and non-negative for Sell listings, absent otherwise
pub fn validate_price_rule(listing_type: ListingType, price: Option<f64>) -> Result<(), String> {
    match (listing_type, price) {
        (ListingType::Sell, None) => Err("Price is required for items listed for sale".to_string()),
        (ListingType::Sell, Some(p)) if p < 0.0 => Err("Price cannot be negative".to_string()),
        (ListingType::Sell, Some(_)) => Ok(()),
        (_, Some(_)) => Err("Price is only allowed for items listed for sale".to_string()),
        (_, None) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rule() {
        assert!(validate_price_rule(ListingType::Sell, Some(100.0)).is_ok());
        assert!(validate_price_rule(ListingType::Sell, Some(0.0)).is_ok());
        assert!(validate_price_rule(ListingType::Sell, None).is_err());
        assert!(validate_price_rule(ListingType::Sell, Some(-1.0)).is_err());
        assert!(validate_price_rule(ListingType::Lend, None).is_ok());
        assert!(validate_price_rule(ListingType::Exchange, Some(5.0)).is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateListingRequest {
            title: "Data Structures in C".to_string(),
            description: "Barely used, no markings".to_string(),
            category: vec!["books".to_string()],
            condition: ItemCondition::LikeNew,
            listing_type: ListingType::Sell,
            price: Some(250.0),
            images: vec![],
            tags: vec!["cs".to_string()],
        };
        assert!(validator::Validate::validate(&req).is_ok());
        assert!(req.validate_price().is_ok());

        let bad_category = CreateListingRequest {
            category: vec!["spaceships".to_string()],
            ..req
        };
        assert!(validator::Validate::validate(&bad_category).is_err());
    }

    #[test]
    fn test_condition_serde_display_names() {
        let json = serde_json::to_string(&ItemCondition::LikeNew).unwrap();
        assert_eq!(json, "\"Like New\"");
        let parsed: ItemCondition = serde_json::from_str("\"Very Good\"").unwrap();
        assert_eq!(parsed, ItemCondition::VeryGood);
    }
}
