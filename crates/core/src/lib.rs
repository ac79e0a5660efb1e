//! Core utilities for the Pocket Musala lookup service
//!
//! Shared by every crate in the workspace:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML file plus environment overrides, validated on load
//! - **Resilience**: retry backoff and a circuit breaker for document store calls
//! - **Health checks**: pluggable checks rolled up into a report
//!
//! # Example
//!
//! ```rust,no_run
//! use musala_core::config::Config;
//!
//! let config = Config::load(None)?;
//! println!("searching collection {}", config.schema.search.collection_name);
//! # Ok::<(), musala_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod health;
pub mod retry;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, SearchConfig, ServiceConfig, StoreBackend};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::health::{CheckResult, HealthCheck, HealthChecker, HealthReport, HealthStatus};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
}
