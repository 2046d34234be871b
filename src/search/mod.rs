pub mod controller;
pub mod http;
pub mod traits;
pub mod types;

pub use controller::{MemoryUrl, SearchController, UrlSync};
pub use http::HttpSearchGateway;
pub use traits::SearchGateway;
pub use types::{FilterPatch, FilterSet, FilterUpdate, ResultPage};
