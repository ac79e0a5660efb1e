//! Error types for the Firestore client

use musala_mosques::StoreError;
use thiserror::Error;

/// Result type alias for Firestore operations
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Firestore client errors
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Firestore returned an error response
    #[error("Firestore error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body from Firestore
        message: String,
    },

    /// A document in the response could not be decoded
    #[error("Malformed document: {0}")]
    Decode(String),

    /// Circuit breaker is open
    #[error("Circuit breaker is open - Firestore temporarily unavailable")]
    CircuitOpen,

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

impl FirestoreError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            // Retry on connection errors, timeouts
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            // Retry on 5xx errors and 429 (quota)
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Json(_)
            | Self::Config(_)
            | Self::Decode(_)
            | Self::CircuitOpen
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }
}

impl From<FirestoreError> for StoreError {
    fn from(err: FirestoreError) -> Self {
        let message = err.to_string();
        match err {
            FirestoreError::Json(_) | FirestoreError::Decode(_) => StoreError::InvalidResponse(message),
            FirestoreError::Api { status, .. } if (400..500).contains(&status) && status != 429 => {
                StoreError::Query(message)
            }
            FirestoreError::Config(_) => StoreError::Query(message),
            FirestoreError::Request(_)
            | FirestoreError::Api { .. }
            | FirestoreError::CircuitOpen
            | FirestoreError::RetriesExhausted { .. } => StoreError::Unavailable(message),
        }
    }
}
