//! Configuration file loading and environment overrides

use super::schema::{RangeMode, ServiceConfig, StoreBackend};
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files probed, in order, when no explicit path is given.
pub const CONFIG_CANDIDATES: [&str; 3] = ["musala.toml", ".musala.toml", "config/musala.toml"];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ServiceConfig,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load from a file (explicit or discovered), apply process environment
    /// overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ServiceConfig::default(),
        };

        apply_env_overrides(&mut schema, env)?;
        schema.validate().context("Validating service configuration")?;

        debug!(path = ?config_path, backend = %schema.store.backend, "Configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Parsing config file {}", path.display()))
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::invalid_config(key, format!("'{raw}': {e}")))
}

/// Overlay environment variables on top of file values.
pub fn apply_env_overrides<F>(schema: &mut ServiceConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env("FIRESTORE_MOSQUES_COLLECTION") {
        schema.search.collection_name = v;
    }
    if let Some(v) = env("DEFAULT_RADIUS_KM") {
        schema.search.default_radius_km = parse_env("DEFAULT_RADIUS_KM", &v)?;
    }
    if let Some(v) = env("MAX_RADIUS_KM") {
        schema.search.max_radius_km = parse_env("MAX_RADIUS_KM", &v)?;
    }
    if let Some(v) = env("GOOGLE_CLOUD_PROJECT") {
        schema.store.project_id = Some(v);
    }
    if let Some(v) = env("FIRESTORE_EMULATOR_HOST") {
        schema.store.emulator_host = Some(v);
    }
    if let Some(v) = env("FIRESTORE_ACCESS_TOKEN") {
        schema.store.access_token = Some(v);
    }
    if let Some(v) = env("FIRESTORE_RANGE_MODE") {
        schema.store.range_mode = parse_env::<RangeMode>("FIRESTORE_RANGE_MODE", &v)?;
    }
    if let Some(v) = env("MUSALA_STORE") {
        schema.store.backend = parse_env::<StoreBackend>("MUSALA_STORE", &v)?;
    }
    if let Some(v) = env("MUSALA_BIND_ADDR") {
        schema.server.bind_addr = v;
    } else if let Some(v) = env("PORT") {
        let port: u16 = parse_env("PORT", &v)?;
        schema.server.bind_addr = format!("0.0.0.0:{port}");
    }
    if let Some(v) = env("MUSALA_LOG_LEVEL") {
        schema.telemetry.log_level = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.search.collection_name, "mosques");
        assert_eq!(config.schema.search.default_radius_km, 10.0);
        assert_eq!(config.schema.search.max_radius_km, 100.0);
        assert_eq!(config.schema.store.backend, StoreBackend::Firestore);
        assert!(config.schema.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[search]
default_radius_km = 25.0

[store]
backend = "memory"
range_mode = "latitude_only"
"#,
        );

        let config = Config::load_with_env(Some(file.path()), env_from(&[])).unwrap();

        assert_eq!(config.schema.search.default_radius_km, 25.0);
        assert_eq!(config.schema.search.collection_name, "mosques");
        assert_eq!(config.schema.store.backend, StoreBackend::Memory);
        assert_eq!(config.schema.store.range_mode, RangeMode::LatitudeOnly);
        assert_eq!(config.schema.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load_with_env(Some(Path::new("/nonexistent/musala.toml")), env_from(&[]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = write_config("[search\ncollection_name = ");
        let err = Config::load_with_env(Some(file.path()), env_from(&[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[search]\ncollection_name = \"from_file\"\n");
        let env = env_from(&[
            ("FIRESTORE_MOSQUES_COLLECTION", "masajid"),
            ("DEFAULT_RADIUS_KM", "5.5"),
            ("GOOGLE_CLOUD_PROJECT", "pocket-musala"),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8081"),
            ("MUSALA_STORE", "Memory"),
            ("PORT", "9090"),
        ]);

        let config = Config::load_with_env(Some(file.path()), env).unwrap();

        assert_eq!(config.schema.search.collection_name, "masajid");
        assert_eq!(config.schema.search.default_radius_km, 5.5);
        assert_eq!(config.schema.store.project_id.as_deref(), Some("pocket-musala"));
        assert_eq!(config.schema.store.effective_base_url(), "http://localhost:8081/v1");
        assert_eq!(config.schema.store.backend, StoreBackend::Memory);
        assert_eq!(config.schema.server.bind_addr, "0.0.0.0:9090");
    }

    #[test]
    fn test_bind_addr_wins_over_port() {
        let mut schema = ServiceConfig::default();
        apply_env_overrides(
            &mut schema,
            env_from(&[("MUSALA_BIND_ADDR", "127.0.0.1:3000"), ("PORT", "9090")]),
        )
        .unwrap();
        assert_eq!(schema.server.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_env_number_is_error() {
        let mut schema = ServiceConfig::default();
        let err = apply_env_overrides(&mut schema, env_from(&[("DEFAULT_RADIUS_KM", "ten")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("DEFAULT_RADIUS_KM"));
    }

    #[test]
    fn test_validation_rejects_default_above_max() {
        let env = env_from(&[("DEFAULT_RADIUS_KM", "150")]);
        let err = Config::load_with_env(None, env).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("exceeds maximum radius"));
    }

    #[test]
    fn test_validation_rejects_empty_collection() {
        let mut schema = ServiceConfig::default();
        schema.search.collection_name = "  ".to_string();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_bind_addr() {
        let mut schema = ServiceConfig::default();
        schema.server.bind_addr = "not-an-address".to_string();
        let err = schema.validate().unwrap_err();
        assert!(err.message.contains("server.bind_addr"));
    }
}
