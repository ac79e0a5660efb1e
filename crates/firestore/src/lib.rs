//! Firestore REST backend for the Pocket Musala nearby search
//!
//! Issues `runQuery` requests against the Firestore v1 REST API and converts the
//! typed-value documents into the plain JSON that the mosque decoder reads.
//!
//! # Features
//!
//! - **Compound or latitude-only range filters**: pick whichever the project's
//!   indexes support; the remainder is applied client-side
//! - **Retry with exponential backoff** for transient failures
//! - **Circuit breaker** to stop hammering an unavailable backend
//! - **Request correlation**: every query carries an `X-Request-ID`
//! - **Emulator support** through `FIRESTORE_EMULATOR_HOST`
//!
//! # Example
//!
//! ```rust,no_run
//! use musala_firestore::{FirestoreConfig, FirestoreStore};
//! use musala_mosques::{DocumentStore, RangeQuery};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FirestoreConfig::new("http://localhost:8080/v1", "demo-pocketmusala");
//! let store = FirestoreStore::new(config)?;
//!
//! let query = RangeQuery::new("mosques").with_range("location.latitude", 21.0, 22.0);
//! let docs = store.range_query(&query).await?;
//! println!("{} documents", docs.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod query;
mod store;
pub mod value;

pub use client::FirestoreClient;
pub use config::FirestoreConfig;
pub use error::{FirestoreError, FirestoreResult};
pub use query::QueryPlan;
pub use store::FirestoreStore;
pub use value::{decode_value, Document};

pub use musala_core::retry::{CircuitState, RetryConfig};
