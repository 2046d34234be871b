use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level kind of listing offered on the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Space,
    Service,
    Equipment,
    Advertiser,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Space => "space",
            ListingType::Service => "service",
            ListingType::Equipment => "equipment",
            ListingType::Advertiser => "advertiser",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "space" => Some(ListingType::Space),
            "service" => Some(ListingType::Service),
            "equipment" => Some(ListingType::Equipment),
            "advertiser" => Some(ListingType::Advertiser),
            _ => None,
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field the remote API can order results by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Price,
    Rating,
    CreatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::CreatedAt => "created_at",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price" => Some(SortField::Price),
            "rating" => Some(SortField::Rating),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Listing summary as returned by the search API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub title: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f32>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Selectable category for a given listing type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    #[serde(default)]
    pub slug: Option<String>,
}
