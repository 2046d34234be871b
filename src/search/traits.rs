use crate::error::Result;
use crate::models::{Category, ListingType};
use crate::search::types::{FilterSet, ResultPage};
use async_trait::async_trait;

/// Common trait for search backends
/// This keeps the controller testable and allows swapping the remote API
/// for a mock or a local index
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Fetch one page of listings matching the filters
    async fn search(&self, filters: &FilterSet) -> Result<ResultPage>;

    /// Fetch the selectable categories, optionally narrowed to one type
    async fn list_categories(&self, listing_type: Option<ListingType>) -> Result<Vec<Category>>;
}
