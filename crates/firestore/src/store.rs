//! [`DocumentStore`] backed by the Firestore REST API

use crate::client::FirestoreClient;
use crate::config::FirestoreConfig;
use crate::error::FirestoreResult;
use crate::query::QueryPlan;
use musala_core::retry::CircuitState;
use musala_mosques::{DocumentStore, RangeQuery, RawDocument, StoreError};
use std::future::Future;
use tracing::debug;

/// Firestore-backed document store
#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        Ok(Self {
            client: FirestoreClient::with_config(config)?,
        })
    }

    #[must_use]
    pub fn from_client(client: FirestoreClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &FirestoreClient {
        &self.client
    }

    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.client.circuit_state()
    }

    async fn run(&self, query: &RangeQuery) -> Result<Vec<RawDocument>, StoreError> {
        let plan = QueryPlan::new(query, self.client.config().range_mode);
        let fetched = self.client.run_query(&plan.request).await?;
        let total = fetched.len();

        let matched: Vec<RawDocument> = fetched
            .into_iter()
            .filter(|doc| plan.client_side.iter().all(|range| range.matches(doc)))
            .collect();

        if !plan.client_side.is_empty() {
            debug!(
                collection = %query.collection,
                fetched = total,
                kept = matched.len(),
                "Applied client-side range filters"
            );
        }
        Ok(matched)
    }
}

impl DocumentStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    fn range_query(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send {
        self.run(query)
    }
}
