//! Configuration for the Firestore client
//!
//! Built from the service's [`StoreConfig`], with builder methods for tests and
//! embedding.

use crate::error::{FirestoreError, FirestoreResult};
use musala_core::config::{RangeMode, StoreConfig};
use musala_core::retry::RetryConfig;
use std::time::Duration;

/// Project id used against the emulator when none is configured.
const EMULATOR_PROJECT: &str = "demo-pocketmusala";

/// Client configuration
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST root, e.g. `https://firestore.googleapis.com/v1`
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    /// Bearer token, sent unchanged when present
    pub access_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub range_mode: RangeMode,
}

impl FirestoreConfig {
    /// Create a configuration for a project with default settings
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            database: "(default)".to_string(),
            access_token: None,
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            range_mode: RangeMode::default(),
        }
    }

    /// Derive the client configuration from the service's store section.
    pub fn from_store_config(store: &StoreConfig) -> FirestoreResult<Self> {
        let project_id = match (&store.project_id, &store.emulator_host) {
            (Some(project), _) => project.clone(),
            (None, Some(_)) => EMULATOR_PROJECT.to_string(),
            (None, None) => {
                return Err(FirestoreError::config(
                    "project id is required (set GOOGLE_CLOUD_PROJECT or store.project_id)",
                ))
            }
        };

        let config = Self {
            base_url: store.effective_base_url(),
            project_id,
            database: store.database.clone(),
            access_token: store.access_token.clone(),
            timeout: Duration::from_secs(store.timeout_secs),
            retry: RetryConfig::with_max_attempts(store.max_retries),
            range_mode: store.range_mode,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the bearer token
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_range_mode(mut self, range_mode: RangeMode) -> Self {
        self.range_mode = range_mode;
        self
    }

    /// `.../projects/{project}/databases/{database}/documents`
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }

    /// Endpoint for structured queries against the root collection group.
    pub fn run_query_url(&self) -> String {
        format!("{}:runQuery", self.documents_url())
    }

    /// Validate the configuration
    pub fn validate(&self) -> FirestoreResult<()> {
        if self.base_url.is_empty() {
            return Err(FirestoreError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(FirestoreError::config("base_url must start with http:// or https://"));
        }

        if self.project_id.trim().is_empty() {
            return Err(FirestoreError::config("project_id cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(FirestoreError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_query_url() {
        let config = FirestoreConfig::new("https://firestore.googleapis.com/v1/", "pocket-musala");
        assert_eq!(
            config.run_query_url(),
            "https://firestore.googleapis.com/v1/projects/pocket-musala/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn test_from_store_config_requires_project() {
        let err = FirestoreConfig::from_store_config(&StoreConfig::default()).unwrap_err();
        assert!(matches!(err, FirestoreError::Config(_)));
    }

    #[test]
    fn test_from_store_config_emulator() {
        let store = StoreConfig {
            emulator_host: Some("localhost:8081".to_string()),
            timeout_secs: 3,
            max_retries: 2,
            range_mode: RangeMode::LatitudeOnly,
            ..StoreConfig::default()
        };

        let config = FirestoreConfig::from_store_config(&store).unwrap();

        assert_eq!(config.base_url, "http://localhost:8081/v1");
        assert_eq!(config.project_id, EMULATOR_PROJECT);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.range_mode, RangeMode::LatitudeOnly);
    }

    #[test]
    fn test_from_store_config_production() {
        let store = StoreConfig {
            project_id: Some("pocket-musala".to_string()),
            access_token: Some("token".to_string()),
            ..StoreConfig::default()
        };

        let config = FirestoreConfig::from_store_config(&store).unwrap();

        assert!(config.base_url.starts_with("https://firestore.googleapis.com"));
        assert_eq!(config.access_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_validation() {
        assert!(FirestoreConfig::new("http://localhost:8081/v1", "p").validate().is_ok());
        assert!(FirestoreConfig::new("", "p").validate().is_err());
        assert!(FirestoreConfig::new("ftp://host", "p").validate().is_err());
        assert!(FirestoreConfig::new("http://host", " ").validate().is_err());
        assert!(FirestoreConfig::new("http://host", "p")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
