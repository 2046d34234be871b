use thiserror::Error;

/// Failures surfaced by the search gateway.
///
/// The controller collapses `Network` and `Server` into a single generic
/// user-facing message; the distinction only matters for logging.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("could not reach the search service")]
    Network(#[source] reqwest::Error),

    #[error("search service returned status {status}")]
    Server { status: u16 },

    #[error("could not decode search response")]
    Decode(#[source] reqwest::Error),
}

impl SearchError {
    /// Classify a reqwest failure. Status errors are only produced by
    /// `error_for_status`, everything else is a transport problem.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SearchError::Server {
                status: status.as_u16(),
            },
            None => SearchError::Network(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
