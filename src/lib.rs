//! Client library for the venue rental marketplace search API.
//!
//! [`SearchController`](search::SearchController) owns the filter state and
//! the latest result page, keeps a shareable URL query string in sync, and
//! talks to the remote API through the [`SearchGateway`](search::SearchGateway)
//! trait. Favorites and onboarding state live in small injected stores on
//! top of [`KeyValuePersistence`](storage::KeyValuePersistence).

pub mod error;
pub mod models;
pub mod plans;
pub mod search;
pub mod storage;

pub use error::SearchError;
pub use models::{Category, Listing, ListingType, SortField, SortOrder};
pub use search::{
    FilterPatch, FilterSet, FilterUpdate, HttpSearchGateway, MemoryUrl, ResultPage,
    SearchController, SearchGateway, UrlSync,
};
