use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::models::{Listing, ListingType, SortField, SortOrder};

/// Complete description of the user's current search intent.
///
/// Everything is optional except `page`, which defaults to 1. The URL
/// query string is a view of this struct: it is parsed once when a
/// controller is constructed and rewritten after every filter change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub query: Option<String>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub listing_type: Option<ListingType>,
    pub page: u32,
    pub per_page: Option<u32>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            state: None,
            city: None,
            min_price: None,
            max_price: None,
            sort_by: None,
            sort_order: None,
            listing_type: None,
            page: 1,
            per_page: None,
        }
    }
}

/// String fields skip the empty string and the `"all"` placeholder the
/// category dropdowns use for "no filter".
fn meaningful(value: &str) -> bool {
    !value.is_empty() && value != "all"
}

/// A price from a hand-editable URL. `str::parse::<f64>` accepts `NaN`,
/// `inf`, and overflowing literals like `1e999`; none of those may enter
/// the filter state, so only finite non-negative values pass.
fn parse_price(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

impl FilterSet {
    pub fn for_type(listing_type: ListingType) -> Self {
        Self {
            listing_type: Some(listing_type),
            ..Self::default()
        }
    }

    /// Reset every filter except the listing type.
    pub fn cleared(&self) -> Self {
        Self {
            listing_type: self.listing_type,
            ..Self::default()
        }
    }

    /// Overlay values parsed from a URL query string onto `self`.
    ///
    /// Recognized keys: `query, category, state, city, minPrice, maxPrice,
    /// sortBy, sortOrder, page`. Unknown keys are ignored. Numeric and enum
    /// values that fail to parse are rejected and the existing value kept,
    /// so a hand-edited `minPrice=abc` never poisons the state.
    pub fn apply_url_query(&mut self, query_string: &str) {
        for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
            match key.as_ref() {
                "query" => self.query = Some(value.into_owned()),
                "category" => self.category = Some(value.into_owned()),
                "state" => self.state = Some(value.into_owned()),
                "city" => self.city = Some(value.into_owned()),
                "minPrice" => {
                    if let Some(v) = parse_price(&value) {
                        self.min_price = Some(v);
                    }
                }
                "maxPrice" => {
                    if let Some(v) = parse_price(&value) {
                        self.max_price = Some(v);
                    }
                }
                "sortBy" => {
                    if let Some(v) = SortField::parse(&value) {
                        self.sort_by = Some(v);
                    }
                }
                "sortOrder" => {
                    if let Some(v) = SortOrder::parse(&value) {
                        self.sort_order = Some(v);
                    }
                }
                "page" => {
                    if let Ok(v) = value.parse::<u32>() {
                        if v >= 1 {
                            self.page = v;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Serialize the shareable subset of the filters as a URL query string.
    ///
    /// Absent and placeholder values are omitted, as are the listing type
    /// and page size, which belong to the page hosting the search rather
    /// than the search itself. Page 1 is the default and is also omitted.
    pub fn to_url_query(&self) -> String {
        let mut pairs = form_urlencoded::Serializer::new(String::new());
        if let Some(v) = self.query.as_deref().filter(|v| meaningful(v)) {
            pairs.append_pair("query", v);
        }
        if let Some(v) = self.category.as_deref().filter(|v| meaningful(v)) {
            pairs.append_pair("category", v);
        }
        if let Some(v) = self.state.as_deref().filter(|v| meaningful(v)) {
            pairs.append_pair("state", v);
        }
        if let Some(v) = self.city.as_deref().filter(|v| meaningful(v)) {
            pairs.append_pair("city", v);
        }
        if let Some(v) = self.min_price {
            pairs.append_pair("minPrice", &v.to_string());
        }
        if let Some(v) = self.max_price {
            pairs.append_pair("maxPrice", &v.to_string());
        }
        if let Some(v) = self.sort_by {
            pairs.append_pair("sortBy", v.as_str());
        }
        if let Some(v) = self.sort_order {
            pairs.append_pair("sortOrder", v.as_str());
        }
        if self.page > 1 {
            pairs.append_pair("page", &self.page.to_string());
        }
        pairs.finish()
    }

    /// Full parameter list for the search request, including the fields
    /// the URL leaves out.
    pub fn to_request_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = self.query.as_deref().filter(|v| meaningful(v)) {
            params.push(("query", v.to_string()));
        }
        if let Some(v) = self.category.as_deref().filter(|v| meaningful(v)) {
            params.push(("category", v.to_string()));
        }
        if let Some(v) = self.state.as_deref().filter(|v| meaningful(v)) {
            params.push(("state", v.to_string()));
        }
        if let Some(v) = self.city.as_deref().filter(|v| meaningful(v)) {
            params.push(("city", v.to_string()));
        }
        if let Some(v) = self.min_price {
            params.push(("minPrice", v.to_string()));
        }
        if let Some(v) = self.max_price {
            params.push(("maxPrice", v.to_string()));
        }
        if let Some(v) = self.sort_by {
            params.push(("sortBy", v.as_str().to_string()));
        }
        if let Some(v) = self.sort_order {
            params.push(("sortOrder", v.as_str().to_string()));
        }
        if let Some(v) = self.listing_type {
            params.push(("type", v.as_str().to_string()));
        }
        params.push(("page", self.page.to_string()));
        if let Some(v) = self.per_page {
            params.push(("perPage", v.to_string()));
        }
        params
    }
}

/// Single-field change to a [`FilterSet`].
#[derive(Debug, Clone)]
pub enum FilterUpdate {
    Query(String),
    Category(String),
    State(String),
    City(String),
    MinPrice(Option<f64>),
    MaxPrice(Option<f64>),
    SortBy(SortField),
    SortOrder(SortOrder),
    ListingType(ListingType),
}

/// Multi-field change to a [`FilterSet`]; only set fields are merged.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub query: Option<String>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub listing_type: Option<ListingType>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.category.is_none()
            && self.state.is_none()
            && self.city.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.sort_by.is_none()
            && self.sort_order.is_none()
            && self.listing_type.is_none()
    }
}

/// One fetched page of results plus its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub results: Vec<Listing>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl ResultPage {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}
