use crate::error::{Result, SearchError};
use crate::models::{Category, ListingType};
use crate::search::traits::SearchGateway;
use crate::search::types::{FilterSet, ResultPage};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Search gateway backed by the marketplace HTTP API
pub struct HttpSearchGateway {
    client: Client,
    base_url: String,
}

impl HttpSearchGateway {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("venue-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn search(&self, filters: &FilterSet) -> Result<ResultPage> {
        let url = format!("{}/search", self.base_url);
        debug!("Fetching {} with {:?}", url, filters);

        let response = self
            .client
            .get(&url)
            .query(&filters.to_request_params())
            .send()
            .await
            .map_err(SearchError::from_reqwest)?
            .error_for_status()
            .map_err(SearchError::from_reqwest)?;

        let page: ResultPage = response.json().await.map_err(SearchError::Decode)?;
        info!(
            "Search returned {} of {} listings (page {}/{})",
            page.results.len(),
            page.total,
            page.page,
            page.total_pages
        );
        Ok(page)
    }

    async fn list_categories(&self, listing_type: Option<ListingType>) -> Result<Vec<Category>> {
        let url = format!("{}/categories", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(t) = listing_type {
            request = request.query(&[("type", t.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(SearchError::from_reqwest)?
            .error_for_status()
            .map_err(SearchError::from_reqwest)?;

        let categories: Vec<Category> = response.json().await.map_err(SearchError::Decode)?;
        debug!("Loaded {} categories", categories.len());
        Ok(categories)
    }
}
