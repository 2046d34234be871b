use crate::models::Category;
use crate::search::traits::SearchGateway;
use crate::search::types::{FilterPatch, FilterSet, FilterUpdate, ResultPage};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Access to the browser-addressable URL query string.
///
/// The controller reads it exactly once, at construction, and only writes
/// it afterwards. Writes must never be observed as navigations that feed
/// back into another controller read.
pub trait UrlSync: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, query: &str);
}

/// In-memory query string, for tests and for embedding outside a browser
#[derive(Default)]
pub struct MemoryUrl {
    query: Mutex<Option<String>>,
}

impl MemoryUrl {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Mutex::new(Some(query.into())),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.query.lock().unwrap().clone()
    }

    pub fn replace(&self, query: impl Into<String>) {
        *self.query.lock().unwrap() = Some(query.into());
    }
}

impl UrlSync for MemoryUrl {
    fn read(&self) -> Option<String> {
        self.current()
    }

    fn write(&self, query: &str) {
        self.replace(query.to_string());
    }
}

/// Single source of truth for "what is the user searching for" and "what
/// did that search return".
///
/// Filter mutations go through the update operations below, which reset
/// the page, refetch when a query-affecting field changed, reload the
/// category list when the listing type changed, and rewrite the URL once
/// [`init`](SearchController::init) has run. All operations take
/// `&mut self`, so fetches are serialized and a superseded request can
/// never overwrite a newer result.
pub struct SearchController {
    filters: FilterSet,
    results: ResultPage,
    categories: Vec<Category>,
    loading: bool,
    last_error: Option<String>,
    initialized: bool,
    gateway: Arc<dyn SearchGateway>,
    url: Arc<dyn UrlSync>,
}

/// Generic user-facing failure message; the network/server distinction is
/// kept in the logs only.
const SEARCH_FAILED: &str = "Search failed. Please try again.";

/// A cleared text input clears the filter; `Some("")` never enters state.
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SearchController {
    /// Build a controller from caller defaults overlaid with whatever the
    /// current URL query string says. No network call happens here; the
    /// first fetch belongs to [`init`](SearchController::init).
    pub fn new(
        defaults: FilterSet,
        gateway: Arc<dyn SearchGateway>,
        url: Arc<dyn UrlSync>,
    ) -> Self {
        let mut filters = defaults;
        if let Some(query_string) = url.read() {
            filters.apply_url_query(&query_string);
        }
        debug!("Controller initialized with {:?}", filters);

        Self {
            filters,
            results: ResultPage::empty(),
            categories: Vec::new(),
            loading: false,
            last_error: None,
            initialized: false,
            gateway,
            url,
        }
    }

    /// Run the first search cycle: fetch results and categories, then arm
    /// the URL writes. Until this has run the URL is left untouched.
    pub async fn init(&mut self) {
        self.search().await;
        self.reload_categories().await;
        self.initialized = true;
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn results(&self) -> &ResultPage {
        &self.results
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace one filter field and reset to page 1.
    pub async fn update_filter(&mut self, update: FilterUpdate) {
        let mut type_changed = false;
        match update {
            FilterUpdate::Query(v) => self.filters.query = non_empty(v),
            FilterUpdate::Category(v) => self.filters.category = non_empty(v),
            FilterUpdate::State(v) => self.filters.state = non_empty(v),
            FilterUpdate::City(v) => self.filters.city = non_empty(v),
            FilterUpdate::MinPrice(v) => self.filters.min_price = v,
            FilterUpdate::MaxPrice(v) => self.filters.max_price = v,
            FilterUpdate::SortBy(v) => self.filters.sort_by = Some(v),
            FilterUpdate::SortOrder(v) => self.filters.sort_order = Some(v),
            FilterUpdate::ListingType(v) => {
                type_changed = self.filters.listing_type != Some(v);
                self.filters.listing_type = Some(v);
            }
        }
        let page_changed = self.filters.page != 1;
        self.filters.page = 1;
        self.after_change(!type_changed || page_changed, type_changed)
            .await;
    }

    /// Merge every set field of the patch and reset to page 1.
    pub async fn update_filters(&mut self, patch: FilterPatch) {
        if patch.is_empty() {
            return;
        }
        let mut query_changed = false;
        let mut type_changed = false;

        macro_rules! merge {
            ($field:ident) => {
                if let Some(v) = patch.$field {
                    let v = non_empty(v);
                    query_changed |= self.filters.$field != v;
                    self.filters.$field = v;
                }
            };
        }
        merge!(query);
        merge!(category);
        merge!(state);
        merge!(city);
        if let Some(v) = patch.min_price {
            query_changed |= self.filters.min_price != Some(v);
            self.filters.min_price = Some(v);
        }
        if let Some(v) = patch.max_price {
            query_changed |= self.filters.max_price != Some(v);
            self.filters.max_price = Some(v);
        }
        if let Some(v) = patch.sort_by {
            query_changed |= self.filters.sort_by != Some(v);
            self.filters.sort_by = Some(v);
        }
        if let Some(v) = patch.sort_order {
            query_changed |= self.filters.sort_order != Some(v);
            self.filters.sort_order = Some(v);
        }
        if let Some(v) = patch.listing_type {
            type_changed = self.filters.listing_type != Some(v);
            self.filters.listing_type = Some(v);
        }

        query_changed |= self.filters.page != 1;
        self.filters.page = 1;
        self.after_change(query_changed, type_changed).await;
    }

    /// Drop every filter except the listing type and refetch.
    pub async fn clear_filters(&mut self) {
        self.filters = self.filters.cleared();
        self.after_change(true, false).await;
    }

    /// Advance one page; no-op on the last known page.
    pub async fn next_page(&mut self) {
        if !self.results.has_next() {
            return;
        }
        self.filters.page += 1;
        self.after_change(true, false).await;
    }

    /// Go back one page; no-op on page 1.
    pub async fn prev_page(&mut self) {
        if self.filters.page <= 1 {
            return;
        }
        self.filters.page -= 1;
        self.after_change(true, false).await;
    }

    /// Jump to a specific page; no-op outside `[1, total_pages]` as known
    /// from the last fetched page, and when already there.
    pub async fn go_to_page(&mut self, page: u32) {
        if page == 0 || page > self.results.total_pages || page == self.filters.page {
            return;
        }
        self.filters.page = page;
        self.after_change(true, false).await;
    }

    async fn after_change(&mut self, query_changed: bool, type_changed: bool) {
        self.sync_url();
        if type_changed {
            self.reload_categories().await;
        }
        if query_changed {
            self.search().await;
        }
    }

    fn sync_url(&self) {
        if self.initialized {
            self.url.write(&self.filters.to_url_query());
        }
    }

    /// Fetch one page for the current filters. On failure the previous
    /// results stay visible and only the error flag changes.
    pub async fn search(&mut self) {
        let filters = self.filters.clone();
        self.search_with(&filters).await;
    }

    /// Fetch with an explicit filter set, leaving the stored filters alone.
    pub async fn search_with(&mut self, filters: &FilterSet) {
        self.loading = true;
        self.last_error = None;
        match self.gateway.search(filters).await {
            Ok(page) => {
                self.results = page;
            }
            Err(err) => {
                warn!("Search request failed: {err}");
                self.last_error = Some(SEARCH_FAILED.to_string());
            }
        }
        self.loading = false;
    }

    /// Reload the category list for the current listing type. Failures
    /// are logged and the current list is left as-is.
    pub async fn reload_categories(&mut self) {
        match self
            .gateway
            .list_categories(self.filters.listing_type)
            .await
        {
            Ok(categories) => self.categories = categories,
            Err(err) => warn!("Category load failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SearchError};
    use crate::models::{Listing, ListingType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn listing(id: &str) -> Listing {
        Listing {
            id: id.to_string(),
            listing_type: ListingType::Space,
            title: format!("Listing {id}"),
            city: Some("Curitiba".to_string()),
            state: Some("PR".to_string()),
            price: Some(250.0),
            rating: Some(4.5),
            image_url: None,
            created_at: None,
        }
    }

    /// Gateway returning canned pages and recording every call
    struct MockGateway {
        searches: Mutex<Vec<FilterSet>>,
        category_requests: Mutex<Vec<Option<ListingType>>>,
        total_pages: u32,
        fail: AtomicBool,
    }

    impl MockGateway {
        fn with_pages(total_pages: u32) -> Arc<Self> {
            Arc::new(Self {
                searches: Mutex::new(Vec::new()),
                category_requests: Mutex::new(Vec::new()),
                total_pages,
                fail: AtomicBool::new(false),
            })
        }

        fn search_count(&self) -> usize {
            self.searches.lock().unwrap().len()
        }

        fn last_search(&self) -> FilterSet {
            self.searches.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl SearchGateway for MockGateway {
        async fn search(&self, filters: &FilterSet) -> Result<ResultPage> {
            self.searches.lock().unwrap().push(filters.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(SearchError::Server { status: 500 });
            }
            Ok(ResultPage {
                results: vec![listing("a"), listing("b")],
                total: u64::from(self.total_pages) * 2,
                page: filters.page,
                total_pages: self.total_pages,
            })
        }

        async fn list_categories(
            &self,
            listing_type: Option<ListingType>,
        ) -> Result<Vec<Category>> {
            self.category_requests.lock().unwrap().push(listing_type);
            Ok(vec![Category {
                id: "1".to_string(),
                name: "Party hall".to_string(),
                listing_type: listing_type.unwrap_or(ListingType::Space),
                slug: None,
            }])
        }
    }

    fn controller(
        gateway: &Arc<MockGateway>,
        url: &Arc<MemoryUrl>,
    ) -> SearchController {
        SearchController::new(
            FilterSet::for_type(ListingType::Space),
            gateway.clone(),
            url.clone(),
        )
    }

    #[tokio::test]
    async fn construction_overlays_url_on_defaults() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::new("state=SP&page=3"));
        let ctrl = controller(&gateway, &url);
        assert_eq!(ctrl.filters().state.as_deref(), Some("SP"));
        assert_eq!(ctrl.filters().page, 3);
        assert_eq!(ctrl.filters().listing_type, Some(ListingType::Space));
        assert_eq!(gateway.search_count(), 0);
    }

    #[tokio::test]
    async fn url_is_read_only_once() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::new("state=SP"));
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;

        // An external edit to the query string must not leak into state.
        url.replace("state=RJ&city=Niteroi");
        ctrl.update_filter(FilterUpdate::Query("dj".to_string())).await;
        assert_eq!(ctrl.filters().state.as_deref(), Some("SP"));
        assert_eq!(ctrl.filters().city, None);
    }

    #[tokio::test]
    async fn updating_a_filter_resets_page_and_fetches() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::new("page=4"));
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        assert_eq!(ctrl.filters().page, 4);

        ctrl.update_filter(FilterUpdate::City("Curitiba".to_string()))
            .await;
        assert_eq!(ctrl.filters().page, 1);
        assert_eq!(ctrl.filters().city.as_deref(), Some("Curitiba"));

        let sent = gateway.last_search();
        assert_eq!(sent.city.as_deref(), Some("Curitiba"));
        assert_eq!(sent.page, 1);
        assert_eq!(sent.listing_type, Some(ListingType::Space));
    }

    #[tokio::test]
    async fn patch_updates_merge_and_reset_page() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        ctrl.go_to_page(3).await;

        ctrl.update_filters(FilterPatch {
            city: Some("Recife".to_string()),
            min_price: Some(100.0),
            ..FilterPatch::default()
        })
        .await;
        assert_eq!(ctrl.filters().page, 1);
        assert_eq!(ctrl.filters().city.as_deref(), Some("Recife"));
        assert_eq!(ctrl.filters().min_price, Some(100.0));
    }

    #[tokio::test]
    async fn emptied_text_inputs_clear_their_filters() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::new("city=Curitiba&state=PR"));
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;

        ctrl.update_filter(FilterUpdate::City(String::new())).await;
        assert_eq!(ctrl.filters().city, None);

        ctrl.update_filters(FilterPatch {
            state: Some(String::new()),
            query: Some("dj".to_string()),
            ..FilterPatch::default()
        })
        .await;
        assert_eq!(ctrl.filters().state, None);
        assert_eq!(ctrl.filters().query.as_deref(), Some("dj"));
        assert_eq!(url.current().as_deref(), Some("query=dj"));
    }

    #[tokio::test]
    async fn clear_keeps_only_the_listing_type() {
        let gateway = MockGateway::with_pages(5);
        let url = Arc::new(MemoryUrl::new("city=Curitiba&minPrice=50"));
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;

        ctrl.clear_filters().await;
        assert_eq!(*ctrl.filters(), FilterSet::for_type(ListingType::Space));
        assert_eq!(gateway.last_search().city, None);
    }

    #[tokio::test]
    async fn next_page_stops_at_the_last_known_page() {
        let gateway = MockGateway::with_pages(2);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;

        ctrl.next_page().await;
        assert_eq!(ctrl.filters().page, 2);
        let fetches = gateway.search_count();

        ctrl.next_page().await;
        assert_eq!(ctrl.filters().page, 2);
        assert_eq!(gateway.search_count(), fetches);
    }

    #[tokio::test]
    async fn prev_page_stops_at_page_one() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        let fetches = gateway.search_count();

        ctrl.prev_page().await;
        assert_eq!(ctrl.filters().page, 1);
        assert_eq!(gateway.search_count(), fetches);
    }

    #[tokio::test]
    async fn go_to_page_rejects_out_of_range_targets() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        let fetches = gateway.search_count();

        ctrl.go_to_page(0).await;
        ctrl.go_to_page(4).await;
        assert_eq!(ctrl.filters().page, 1);
        assert_eq!(gateway.search_count(), fetches);

        ctrl.go_to_page(3).await;
        assert_eq!(ctrl.filters().page, 3);
        assert_eq!(gateway.search_count(), fetches + 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_results() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        assert!(ctrl.results().has_results());
        assert!(ctrl.last_error().is_none());
        let before = ctrl.results().clone();

        gateway.fail.store(true, Ordering::SeqCst);
        ctrl.update_filter(FilterUpdate::Query("band".to_string()))
            .await;
        assert!(!ctrl.is_loading());
        assert!(ctrl.last_error().is_some());
        assert_eq!(ctrl.results().total, before.total);
        assert_eq!(ctrl.results().page, before.page);

        // A later successful search clears the error again.
        gateway.fail.store(false, Ordering::SeqCst);
        ctrl.search().await;
        assert!(ctrl.last_error().is_none());
    }

    #[tokio::test]
    async fn type_change_reloads_categories_without_a_fetch() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;
        let fetches = gateway.search_count();
        assert_eq!(ctrl.categories().len(), 1);

        ctrl.update_filter(FilterUpdate::ListingType(ListingType::Service))
            .await;
        assert_eq!(gateway.search_count(), fetches);
        assert_eq!(
            *gateway.category_requests.lock().unwrap().last().unwrap(),
            Some(ListingType::Service)
        );
    }

    #[tokio::test]
    async fn url_writes_start_after_init_and_skip_the_type() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);

        ctrl.search().await;
        assert_eq!(url.current(), None);

        ctrl.init().await;
        ctrl.update_filter(FilterUpdate::City("Curitiba".to_string()))
            .await;
        assert_eq!(url.current().as_deref(), Some("city=Curitiba"));

        ctrl.next_page().await;
        assert_eq!(url.current().as_deref(), Some("city=Curitiba&page=2"));
    }

    #[tokio::test]
    async fn explicit_search_with_leaves_filters_alone() {
        let gateway = MockGateway::with_pages(3);
        let url = Arc::new(MemoryUrl::default());
        let mut ctrl = controller(&gateway, &url);
        ctrl.init().await;

        let mut other = FilterSet::for_type(ListingType::Equipment);
        other.city = Some("Salvador".to_string());
        ctrl.search_with(&other).await;

        assert_eq!(gateway.last_search().city.as_deref(), Some("Salvador"));
        assert_eq!(ctrl.filters().city, None);
        assert_eq!(ctrl.filters().listing_type, Some(ListingType::Space));
    }
}
