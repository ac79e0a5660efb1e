//! Store selection for the running service.

use anyhow::Context;
use musala_core::config::{StoreBackend, StoreConfig};
use musala_core::health::{CheckResult, HealthCheck};
use musala_core::retry::CircuitState;
use musala_firestore::{FirestoreConfig, FirestoreStore};
use musala_mosques::{DocumentStore, MemoryStore, RangeQuery, RawDocument, StoreError};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The document store chosen at startup
#[derive(Clone)]
pub enum Backend {
    Firestore(FirestoreStore),
    Memory(Arc<MemoryStore>),
}

impl Backend {
    /// Build the configured store. The memory backend loads `seed_path` when set
    /// and starts empty otherwise.
    pub fn from_config(config: &StoreConfig, collection: &str) -> anyhow::Result<Self> {
        match config.backend {
            StoreBackend::Firestore => {
                let firestore = FirestoreConfig::from_store_config(config)
                    .context("Invalid Firestore configuration")?;
                info!(
                    base_url = %firestore.base_url,
                    project = %firestore.project_id,
                    range_mode = ?firestore.range_mode,
                    "Using Firestore store"
                );
                Ok(Self::Firestore(FirestoreStore::new(firestore)?))
            }
            StoreBackend::Memory => {
                let store = match config.seed_path {
                    Some(ref path) => MemoryStore::from_seed_file(collection, path).map_err(|e| {
                        musala_core::Error::from(e)
                            .with_context(format!("Loading seed file {}", path.display()))
                            .with_suggestion("Seed files hold a JSON array of documents with an \"id\" key")
                    })?,
                    None => {
                        warn!("Memory store has no seed file; every search will be empty");
                        MemoryStore::new()
                    }
                };
                info!(documents = store.len(collection), "Using in-memory store");
                Ok(Self::Memory(Arc::new(store)))
            }
        }
    }
}

impl DocumentStore for Backend {
    fn name(&self) -> &'static str {
        match self {
            Self::Firestore(store) => store.name(),
            Self::Memory(store) => store.name(),
        }
    }

    fn range_query(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send {
        async move {
            match self {
                Self::Firestore(store) => store.range_query(query).await,
                Self::Memory(store) => store.range_query(query).await,
            }
        }
    }
}

/// Reports the store backend, and for Firestore the circuit breaker state.
pub struct StoreHealth {
    backend: Backend,
    collection: String,
}

impl StoreHealth {
    pub fn new(backend: Backend, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }
}

impl HealthCheck for StoreHealth {
    fn check(&self) -> CheckResult {
        let start = Instant::now();
        let result = match &self.backend {
            Backend::Firestore(store) => {
                let state = store.circuit_state();
                let check = match state {
                    CircuitState::Closed => CheckResult::healthy("store"),
                    CircuitState::HalfOpen => {
                        CheckResult::degraded("store", "Firestore is recovering from failures")
                    }
                    CircuitState::Open => {
                        CheckResult::unhealthy("store", "Firestore circuit breaker is open")
                    }
                };
                check.with_detail("circuit", circuit_label(state))
            }
            Backend::Memory(store) => CheckResult::healthy("store")
                .with_detail("documents", store.len(&self.collection).to_string()),
        };

        result
            .with_detail("backend", self.backend.name())
            .with_detail("collection", self.collection.as_str())
            .with_duration(start.elapsed())
    }
}

fn circuit_label(state: CircuitState) -> &'static str {
    match state {
        CircuitState::Closed => "closed",
        CircuitState::HalfOpen => "half_open",
        CircuitState::Open => "open",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musala_core::health::HealthStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_backend_delegates_queries() {
        let store = MemoryStore::new().with_document(
            "mosques",
            "a",
            json!({"location": {"latitude": 1.0, "longitude": 1.0}}),
        );
        let backend = Backend::Memory(Arc::new(store));
        let query = RangeQuery::new("mosques").with_range("location.latitude", 0.0, 2.0);

        assert_eq!(backend.name(), "memory");
        assert_eq!(backend.range_query(&query).await.unwrap().len(), 1);
    }

    #[test]
    fn test_memory_backend_without_seed_is_empty() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let backend = Backend::from_config(&config, "mosques").unwrap();
        match backend {
            Backend::Memory(store) => assert_eq!(store.len("mosques"), 0),
            Backend::Firestore(_) => panic!("expected memory backend"),
        }
    }

    #[test]
    fn test_bad_seed_file_reports_store_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosques.json");
        std::fs::write(&path, "not json").unwrap();
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            seed_path: Some(path),
            ..StoreConfig::default()
        };

        let err = Backend::from_config(&config, "mosques").err().expect("from_config should fail");
        let core = err.downcast_ref::<musala_core::Error>().expect("core error");
        assert_eq!(core.code, musala_core::ErrorCode::StoreError);
        assert!(core.context.as_deref().unwrap_or_default().starts_with("Loading seed file"));
    }

    #[test]
    fn test_firestore_backend_requires_project() {
        let config = StoreConfig::default();
        assert!(Backend::from_config(&config, "mosques").is_err());
    }

    #[test]
    fn test_store_health_details() {
        let backend = Backend::Memory(Arc::new(MemoryStore::new()));
        let result = StoreHealth::new(backend, "mosques").check();

        assert_eq!(result.status, HealthStatus::Healthy);
        assert_eq!(result.details["backend"], "memory");
        assert_eq!(result.details["documents"], "0");
    }

    #[test]
    fn test_firestore_health_reports_circuit() {
        let store = FirestoreStore::new(FirestoreConfig::new("http://localhost:8080/v1", "demo"))
            .unwrap();
        let result = StoreHealth::new(Backend::Firestore(store), "mosques").check();

        assert_eq!(result.status, HealthStatus::Healthy);
        assert_eq!(result.details["circuit"], "closed");
    }
}
