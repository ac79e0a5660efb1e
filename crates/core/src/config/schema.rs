//! Configuration schema definitions
//!
//! Every section deserializes with defaults, so an empty file (or no file) is a
//! valid configuration.

use crate::error::{Error, ErrorCode, Result};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl ServiceConfig {
    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        let store = &self.store;

        Validator::new()
            .required("search.collection_name", &search.collection_name)
            .positive("search.default_radius_km", search.default_radius_km)
            .positive("search.max_radius_km", search.max_radius_km)
            .custom("search.default_radius_km", || {
                (search.default_radius_km > search.max_radius_km).then(|| {
                    format!(
                        "Default radius {} exceeds maximum radius {}",
                        search.default_radius_km, search.max_radius_km
                    )
                })
            })
            .required("store.database", &store.database)
            .range("store.timeout_secs", store.timeout_secs, 1, 300)
            .range("store.max_retries", store.max_retries, 1, 10)
            .custom("server.bind_addr", || {
                self.server
                    .bind_addr
                    .parse::<SocketAddr>()
                    .err()
                    .map(|e| format!("Not a socket address: {e}"))
            })
            .required("telemetry.log_level", &self.telemetry.log_level)
            .warn_if(
                "store.project_id",
                store.backend == StoreBackend::Firestore
                    && store.project_id.is_none()
                    && store.emulator_host.is_none(),
                "No Firestore project configured",
            )
            .validate()
            .to_result()
            .map_err(|e| Error::new(ErrorCode::ConfigValidationError, e.message))
    }
}

/// Nearby search settings injected into the search engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Collection holding the mosque documents
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Radius used when a request does not name one
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,

    /// Largest radius a request may ask for
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            default_radius_km: default_radius_km(),
            max_radius_km: default_max_radius_km(),
        }
    }
}

fn default_collection_name() -> String {
    "mosques".to_string()
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_max_radius_km() -> f64 {
    100.0
}

/// Which document store backs the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Firestore => "firestore",
            StoreBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}' (expected firestore or memory)")),
        }
    }
}

/// How a two-field range query is sent to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// Both latitude and longitude ranges in one composite query
    #[default]
    Compound,
    /// Latitude range only; longitude is filtered after the fetch
    LatitudeOnly,
}

impl FromStr for RangeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "compound" => Ok(RangeMode::Compound),
            "latitude_only" => Ok(RangeMode::LatitudeOnly),
            other => Err(format!("unknown range mode '{other}'")),
        }
    }
}

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Google Cloud project owning the Firestore database
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,

    /// Firestore REST root, without the `projects/...` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `host:port` of a local Firestore emulator; overrides `base_url`
    #[serde(default)]
    pub emulator_host: Option<String>,

    /// Bearer token sent as-is
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub range_mode: RangeMode,

    /// JSON file loaded by the in-memory backend
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            project_id: None,
            database: default_database(),
            base_url: default_base_url(),
            emulator_host: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            range_mode: RangeMode::default(),
            seed_path: None,
        }
    }
}

impl StoreConfig {
    /// REST root actually used: the emulator when configured, else `base_url`.
    pub fn effective_base_url(&self) -> String {
        match self.emulator_host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => format!("http://{}/v1", host.trim_end_matches('/')),
            _ => self.base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of the compact format
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(" Firestore ".parse::<StoreBackend>(), Ok(StoreBackend::Firestore));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_range_mode_from_str() {
        assert_eq!("compound".parse::<RangeMode>(), Ok(RangeMode::Compound));
        assert_eq!("latitude-only".parse::<RangeMode>(), Ok(RangeMode::LatitudeOnly));
        assert!("geohash".parse::<RangeMode>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_radius_above_max_rejected() {
        let mut config = ServiceConfig::default();
        config.search.default_radius_km = 150.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }
}
