//! Run configuration: the city list, secret references, paths and retry policy.
//!
//! The JSON file only ever names *where* a secret lives; the value itself is
//! looked up through a [`KeyStore`] when [`Settings`] is built.
//!
//! ```json
//! {
//!   "cities": [
//!     { "name": "New York", "weather_station_id": "GHCND:USW00094728", "demand_region_code": "NYIS" }
//!   ],
//!   "api": { "weather_token_ref": "NOAA_TOKEN", "demand_key_ref": "EIA_API_KEY" }
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::fetch::RetryPolicy;
use crate::infra::keys::KeyStore;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Values shipped in `.env.example`; they are never real credentials.
const PLACEHOLDER_SECRETS: [&str; 2] = ["YOUR_TOKEN_HERE", "YOUR_API_KEY_HERE"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityConfig {
    pub name: String,
    pub weather_station_id: String,
    pub demand_region_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_weather_token_ref")]
    pub weather_token_ref: String,
    #[serde(default = "default_demand_key_ref")]
    pub demand_key_ref: String,
}

fn default_weather_token_ref() -> String {
    "NOAA_TOKEN".to_string()
}

fn default_demand_key_ref() -> String {
    "EIA_API_KEY".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_token_ref: default_weather_token_ref(),
            demand_key_ref: default_demand_key_ref(),
        }
    }
}

/// The on-disk configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub cities: Vec<CityConfig>,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    /// Loads and validates the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)
            .map_err(|e| PipelineError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// City names must be non-empty and unique; they key every file name.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for city in &self.cities {
            let name = city.name.trim();
            if name.is_empty() {
                return Err(PipelineError::Config("city with empty name".into()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(PipelineError::Config(format!("duplicate city '{name}'")));
            }
        }
        Ok(())
    }
}

/// Resolved API secrets. No `Debug` impl.
#[derive(Clone)]
pub struct Credentials {
    pub weather_token: String,
    pub demand_api_key: String,
}

impl Credentials {
    pub async fn resolve(api: &ApiConfig, store: &dyn KeyStore) -> Result<Self> {
        Ok(Self {
            weather_token: resolve_secret(store, &api.weather_token_ref).await?,
            demand_api_key: resolve_secret(store, &api.demand_key_ref).await?,
        })
    }
}

async fn resolve_secret(store: &dyn KeyStore, reference: &str) -> Result<String> {
    let value = store.get(reference).await?;
    let value = value.trim();
    if value.is_empty() {
        return Err(PipelineError::Config(format!("secret '{reference}' is empty")));
    }
    if PLACEHOLDER_SECRETS.contains(&value) {
        return Err(PipelineError::Config(format!(
            "secret '{reference}' still holds the placeholder value"
        )));
    }
    Ok(value.to_string())
}

/// Where every artifact of a run lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path, reports_dir: &Path, logs_dir: &Path) -> Self {
        Self {
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
            reports_dir: reports_dir.to_path_buf(),
            logs_dir: logs_dir.to_path_buf(),
        }
    }

    pub fn report_file(&self) -> PathBuf {
        self.reports_dir.join("data_quality_report.txt")
    }

    pub fn fetch_history_file(&self) -> PathBuf {
        self.logs_dir.join("fetch_history.csv")
    }

    pub fn join_coverage_file(&self) -> PathBuf {
        self.processed_dir.join("join_coverage.json")
    }

    /// Creates every directory that does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            &self.raw_dir,
            &self.processed_dir,
            &self.reports_dir,
            &self.logs_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(
            Path::new(DEFAULT_DATA_DIR),
            Path::new(DEFAULT_REPORTS_DIR),
            Path::new(DEFAULT_LOGS_DIR),
        )
    }
}

/// Everything a run needs, built once at start-up and passed by reference.
#[derive(Clone)]
pub struct Settings {
    pub cities: Vec<CityConfig>,
    /// `None` for commands that never touch the network.
    pub credentials: Option<Credentials>,
    pub paths: DataPaths,
    pub retry: RetryPolicy,
}

impl Settings {
    /// Settings for offline steps (process, report, analyze, publish).
    pub fn offline(config: AppConfig, paths: DataPaths) -> Self {
        Self {
            cities: config.cities,
            credentials: None,
            paths,
            retry: RetryPolicy::default(),
        }
    }

    /// Settings for runs that fetch; credentials must resolve.
    pub async fn online(config: AppConfig, paths: DataPaths, store: &dyn KeyStore) -> Result<Self> {
        let credentials = Credentials::resolve(&config.api, store).await?;
        info!(cities = config.cities.len(), "Credentials resolved");
        Ok(Self {
            cities: config.cities,
            credentials: Some(credentials),
            paths,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapKeyStore(HashMap<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl KeyStore for MapKeyStore {
        async fn get(&self, reference: &str) -> Result<String> {
            self.0
                .get(reference)
                .map(|v| v.to_string())
                .ok_or_else(|| PipelineError::Config(format!("{reference} not set")))
        }
    }

    const CONFIG: &str = r#"{
        "cities": [
            {"name": "New York", "weather_station_id": "GHCND:USW00094728", "demand_region_code": "NYIS"},
            {"name": "Chicago", "weather_station_id": "GHCND:USW00094846", "demand_region_code": "PJM"}
        ]
    }"#;

    #[test]
    fn test_api_refs_default_when_omitted() {
        let config = AppConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.cities.len(), 2);
        assert_eq!(config.api.weather_token_ref, "NOAA_TOKEN");
        assert_eq!(config.api.demand_key_ref, "EIA_API_KEY");
    }

    #[test]
    fn test_duplicate_or_blank_city_names_rejected() {
        let duplicate = r#"{"cities": [
            {"name": "Seattle", "weather_station_id": "a", "demand_region_code": "SCL"},
            {"name": "seattle", "weather_station_id": "b", "demand_region_code": "SCL"}
        ]}"#;
        assert!(matches!(
            AppConfig::from_json(duplicate),
            Err(PipelineError::Config(_))
        ));

        let blank = r#"{"cities": [{"name": "  ", "weather_station_id": "a", "demand_region_code": "X"}]}"#;
        assert!(matches!(AppConfig::from_json(blank), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::load(&dir.path().join("nope.json")),
            Err(PipelineError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_credentials_resolved_through_store() {
        let store = MapKeyStore(HashMap::from([
            ("NOAA_TOKEN", " abc123 "),
            ("EIA_API_KEY", "k-456"),
        ]));
        let creds = Credentials::resolve(&ApiConfig::default(), &store).await.unwrap();
        assert_eq!(creds.weather_token, "abc123");
        assert_eq!(creds.demand_api_key, "k-456");
    }

    #[tokio::test]
    async fn test_placeholder_or_missing_secret_is_config_error() {
        let placeholder = MapKeyStore(HashMap::from([
            ("NOAA_TOKEN", "YOUR_TOKEN_HERE"),
            ("EIA_API_KEY", "k-456"),
        ]));
        assert!(matches!(
            Credentials::resolve(&ApiConfig::default(), &placeholder).await,
            Err(PipelineError::Config(_))
        ));

        let missing = MapKeyStore(HashMap::from([("NOAA_TOKEN", "abc123")]));
        assert!(matches!(
            Credentials::resolve(&ApiConfig::default(), &missing).await,
            Err(PipelineError::Config(_))
        ));

        let empty = MapKeyStore(HashMap::from([("NOAA_TOKEN", ""), ("EIA_API_KEY", "k")]));
        assert!(matches!(
            Credentials::resolve(&ApiConfig::default(), &empty).await,
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::new(Path::new("d"), Path::new("r"), Path::new("l"));
        assert_eq!(paths.raw_dir, Path::new("d/raw"));
        assert_eq!(paths.processed_dir, Path::new("d/processed"));
        assert_eq!(paths.report_file(), Path::new("r/data_quality_report.txt"));
        assert_eq!(paths.fetch_history_file(), Path::new("l/fetch_history.csv"));
    }
}
