//! Error types for document access and nearby search.

use musala_core::{Error as CoreError, ErrorCode};
use musala_geo::GeoError;
use thiserror::Error;

/// Failures reported by a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused to serve
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query
    #[error("Query failed: {0}")]
    Query(String),

    /// The store answered with something that is not a document list
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    /// Seed data for the in-memory store could not be loaded
    #[error("Invalid seed data: {0}")]
    Seed(String),
}

impl StoreError {
    /// Numeric code in the store range.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
            StoreError::Query(_) => ErrorCode::StoreQueryFailed,
            StoreError::InvalidResponse(_) => ErrorCode::StoreResponseInvalid,
            StoreError::Seed(_) => ErrorCode::StoreError,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::new(err.code(), err.to_string()).with_source(err)
    }
}

/// Errors surfaced by the search engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request parameters were out of range
    #[error(transparent)]
    InvalidRequest(#[from] GeoError),

    /// The range query failed; no partial results are returned
    #[error("Document store failure: {0}")]
    Store(#[from] StoreError),
}

/// Why a raw record was left out of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("record has no location")]
    MissingLocation,

    #[error("location is not a map")]
    MalformedLocation,
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_codes() {
        assert_eq!(StoreError::Unavailable("down".into()).code(), ErrorCode::StoreUnavailable);
        assert_eq!(StoreError::Query("bad".into()).code().category(), "Store");
    }

    #[test]
    fn test_store_error_into_core_error() {
        let err: CoreError = StoreError::Query("index missing".into()).into();
        assert_eq!(err.code, ErrorCode::StoreQueryFailed);
        assert!(err.message.contains("index missing"));
    }

    #[test]
    fn test_search_error_wraps_store_error() {
        let err = SearchError::from(StoreError::Unavailable("timeout".into()));
        assert!(matches!(err, SearchError::Store(StoreError::Unavailable(_))));
        assert_eq!(err.to_string(), "Document store failure: Store unavailable: timeout");
    }
}
