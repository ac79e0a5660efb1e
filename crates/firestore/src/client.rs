//! Firestore REST client

use crate::config::FirestoreConfig;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::RunQueryRequest;
use crate::value::Document;
use musala_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use musala_mosques::RawDocument;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// One element of the `runQuery` response stream. Elements without a document
/// only carry progress information such as `readTime`.
#[derive(Debug, Deserialize)]
struct RunQueryResponseItem {
    #[serde(default)]
    document: Option<Document>,
}

/// Firestore client with retry and circuit breaking
///
/// This client wraps `reqwest` and adds:
/// - Retry with exponential backoff for transient failures
/// - A circuit breaker shared by every clone
/// - Request correlation IDs for tracing
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Client,
    config: Arc<FirestoreConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl FirestoreClient {
    /// Create a new client with specific configuration
    pub fn with_config(config: FirestoreConfig) -> FirestoreResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static("musala-firestore/1.0"));

        if let Some(ref token) = config.access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| FirestoreError::config("access token contains invalid header characters"))?;
            default_headers.insert(AUTHORIZATION, value);
        }

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(FirestoreError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            circuit_breaker: Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Get circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    /// Reset the circuit breaker
    pub fn reset_circuit(&self) {
        self.circuit_breaker.reset();
    }

    /// Run a structured query and return the matching documents in response order.
    #[instrument(skip(self, request), fields(request_id))]
    pub async fn run_query(&self, request: &RunQueryRequest) -> FirestoreResult<Vec<RawDocument>> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        if !self.circuit_breaker.can_execute() {
            warn!(request_id = %request_id, "Circuit breaker is open, rejecting query");
            return Err(FirestoreError::CircuitOpen);
        }

        let items: Vec<RunQueryResponseItem> = self.execute_with_retry(&request_id, request).await?;

        // A document without a usable name is skipped, not fatal to the query
        let docs = items
            .into_iter()
            .filter_map(|item| item.document)
            .filter_map(|document| match document.into_raw() {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "Skipping malformed document");
                    None
                }
            })
            .collect();

        Ok(docs)
    }

    /// Execute request with retry logic
    async fn execute_with_retry(
        &self,
        request_id: &str,
        request: &RunQueryRequest,
    ) -> FirestoreResult<Vec<RunQueryResponseItem>> {
        let retry_config = &self.config.retry;
        let url = self.config.run_query_url();
        let mut last_error: Option<FirestoreError> = None;

        for attempt in 0..retry_config.max_attempts {
            // Wait before retry (except first attempt)
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(request_id, &url, request).await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    self.circuit_breaker.record_success();
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Query succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    // Rejected queries say nothing about backend health
                    if !e.is_client_error() {
                        self.circuit_breaker.record_failure();
                    }

                    if e.is_retryable() && attempt + 1 < retry_config.max_attempts {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Query failed, will retry"
                        );
                        last_error = Some(e);
                    } else if e.is_retryable() && attempt > 0 {
                        last_error = Some(e);
                        break;
                    } else {
                        debug!(
                            request_id = %request_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Query failed, not retrying"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Err(FirestoreError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request(
        &self,
        request_id: &str,
        url: &str,
        request: &RunQueryRequest,
    ) -> FirestoreResult<Vec<RunQueryResponseItem>> {
        let response = self
            .inner
            .post(url)
            .header(X_REQUEST_ID, request_id)
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    async fn handle_response(response: Response) -> FirestoreResult<Vec<RunQueryResponseItem>> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(FirestoreError::api(status.as_u16(), message))
        }
    }
}
