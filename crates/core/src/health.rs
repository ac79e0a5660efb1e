//! Health reporting for the running service
//!
//! Components register [`HealthCheck`]s with a [`HealthChecker`]; the HTTP
//! layer renders the resulting [`HealthReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All checks passed
    Healthy,
    /// Some optional checks failed
    Degraded,
    /// Required checks failed
    Unhealthy,
}

impl HealthStatus {
    /// Returns true if status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Returns true if status is healthy or degraded (still operational)
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Status of the check
    pub status: HealthStatus,
    /// Optional message with details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Duration of the check in milliseconds
    pub duration_ms: u64,
    /// Additional details as key-value pairs
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl CheckResult {
    fn with_status(name: impl Into<String>, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message,
            duration_ms: 0,
            details: BTreeMap::new(),
        }
    }

    /// Create a healthy check result
    pub fn healthy(name: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Healthy, None)
    }

    /// Create an unhealthy check result with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Unhealthy, Some(message.into()))
    }

    /// Create a degraded check result with a message
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Degraded, Some(message.into()))
    }

    /// Set the duration of the check
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Add a detail key-value pair
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Overall health report containing all check results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status based on all checks
    pub status: HealthStatus,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Total duration of all checks in milliseconds
    pub total_duration_ms: u64,
    /// Timestamp when the report was generated
    pub timestamp: String,
}

impl HealthReport {
    /// Create a new health report from check results
    #[must_use]
    pub fn new(checks: Vec<CheckResult>, duration: Duration) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            checks,
            total_duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns true if overall status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Get all checks that failed (not healthy)
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.status.is_healthy())
            .collect()
    }
}

/// Trait for implementing health checks
pub trait HealthCheck: Send + Sync {
    /// Perform the health check and return a result
    fn check(&self) -> CheckResult;
}

/// Health checker with configurable checks
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthChecker {
    /// Create a new health checker with no checks
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Add a health check
    #[must_use]
    pub fn add_check(mut self, check: impl HealthCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Number of registered checks
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when no checks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run all health checks
    #[must_use]
    pub fn run(&self) -> HealthReport {
        let start = Instant::now();
        let results = self
            .checks
            .iter()
            .map(|check| {
                let check_start = Instant::now();
                let result = check.check();
                result.with_duration(check_start.elapsed())
            })
            .collect();

        HealthReport::new(results, start.elapsed())
    }
}
