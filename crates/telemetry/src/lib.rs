//! Telemetry and metrics for the Pocket Musala service
//!
//! - Structured logging with `tracing`, compact or JSON
//! - An in-process metrics registry exported as JSON
//! - [`Timer`] guards for latency histograms

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Samples kept per histogram; older samples are dropped first.
pub const HISTOGRAM_WINDOW: usize = 4096;

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Process-wide session id for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Logging configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default filter directive; `RUST_LOG` wins when set
    pub log_level: String,
    /// Emit one JSON object per line instead of compact text
    pub json: bool,
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    #[must_use]
    pub fn new(log_level: impl Into<String>, json: bool) -> Self {
        Self {
            log_level: log_level.into(),
            json,
            ..Self::default()
        }
    }
}

/// Initialize the global subscriber with default settings
pub fn init() -> anyhow::Result<()> {
    init_with_config(TelemetryConfig::default())
}

/// Initialize the global subscriber
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.log_level, e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_target(config.show_target))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(config.show_target).compact())
            .try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Metrics registry for collecting and exporting metrics
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, VecDeque<f64>>>,
    start_time: Instant,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    /// Increment a counter by a specific amount
    pub fn increment_by(&self, name: &str, value: u64) {
        {
            let counters = read(&self.counters);
            if let Some(counter) = counters.get(name) {
                counter.fetch_add(value, Ordering::Relaxed);
                return;
            }
        }
        write(&self.counters)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Current counter value, zero when never incremented
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        read(&self.counters)
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Set a gauge value
    pub fn gauge(&self, name: &str, value: u64) {
        write(&self.gauges)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    /// Record a histogram value
    pub fn histogram(&self, name: &str, value: f64) {
        let mut histograms = write(&self.histograms);
        let samples = histograms.entry(name.to_string()).or_default();
        if samples.len() == HISTOGRAM_WINDOW {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    /// Summary of a histogram's retained samples
    #[must_use]
    pub fn histogram_stats(&self, name: &str) -> Option<HistogramStats> {
        read(&self.histograms)
            .get(name)
            .map(|samples| HistogramStats::from_values(samples.iter().copied()))
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let counter_values: BTreeMap<String, u64> = read(&self.counters)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        let gauge_values: BTreeMap<String, u64> = read(&self.gauges)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        let histogram_stats: BTreeMap<String, HistogramStats> = read(&self.histograms)
            .iter()
            .map(|(k, v)| (k.clone(), HistogramStats::from_values(v.iter().copied())))
            .collect();

        serde_json::json!({
            "session_id": session_id(),
            "uptime_secs": self.uptime_secs(),
            "counters": counter_values,
            "gauges": gauge_values,
            "histograms": histogram_stats,
        })
    }
}

/// Histogram statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl HistogramStats {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                p50: 0.0,
                p95: 0.0,
                p99: 0.0,
            };
        }

        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sum / count as f64,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Get the global metrics registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Records elapsed milliseconds into a histogram of the global registry, once,
/// on [`Timer::stop`] or drop.
pub struct Timer {
    name: String,
    start: Instant,
    recorded: bool,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let duration = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            metrics().histogram(&self.name, duration.as_secs_f64() * 1000.0);
            tracing::debug!(
                metric = %self.name,
                duration_ms = duration.as_millis(),
                "Timer completed"
            );
        }
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}

/// Structured event with a timestamp and session id
#[derive(Debug, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub event_type: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id().to_string(),
            event_type: event_type.into(),
            data,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            event_type = %self.event_type,
            data = %self.data,
            "Event recorded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counter() {
        let registry = MetricsRegistry::new();
        registry.increment("search.requests");
        registry.increment("search.requests");
        registry.increment_by("search.requests", 3);

        assert_eq!(registry.counter("search.requests"), 5);
        assert_eq!(registry.counter("never.touched"), 0);
    }

    #[test]
    fn test_metrics_gauge() {
        let registry = MetricsRegistry::new();
        registry.gauge("store.documents", 42);
        registry.gauge("store.documents", 100);

        let json = registry.export_json();
        assert_eq!(json["gauges"]["store.documents"], 100);
    }

    #[test]
    fn test_histogram_stats() {
        let stats = HistogramStats::from_values((1..=10).map(f64::from));

        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.p99, 10.0);
    }

    #[test]
    fn test_histogram_ignores_nan_and_handles_empty() {
        let stats = HistogramStats::from_values([f64::NAN].into_iter());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p50, 0.0);
    }

    #[test]
    fn test_histogram_window_drops_oldest() {
        let registry = MetricsRegistry::new();
        for i in 0..(HISTOGRAM_WINDOW + 10) {
            registry.histogram("latency", i as f64);
        }
        let stats = registry.histogram_stats("latency").unwrap();
        assert_eq!(stats.count, HISTOGRAM_WINDOW);
        assert_eq!(stats.min, 10.0);
    }

    #[test]
    fn test_export_json_shape() {
        let registry = MetricsRegistry::new();
        registry.increment("search.requests");
        registry.histogram("search.duration_ms", 12.5);

        let json = registry.export_json();
        assert_eq!(json["counters"]["search.requests"], 1);
        assert_eq!(json["histograms"]["search.duration_ms"]["count"], 1);
        assert_eq!(json["session_id"], session_id());
    }

    #[test]
    fn test_timer_records_once() {
        let name = "test.timer_records_once";
        let timer = Timer::start(name);
        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.stop();

        assert!(duration.as_millis() >= 10);
        assert_eq!(metrics().histogram_stats(name).unwrap().count, 1);
    }

    #[test]
    fn test_timer_records_on_drop() {
        let name = "test.timer_records_on_drop";
        {
            let _timer = Timer::start(name);
        }
        assert_eq!(metrics().histogram_stats(name).unwrap().count, 1);
    }

    #[test]
    fn test_session_id() {
        let id = session_id();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
