use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_WEATHER_BASE: &str = "WEATHER_BASE_ENDPOINT";
pub const ENV_GEOCODING_BASE: &str = "GEOCODING_BASE_ENDPOINT";

/// Suggested endpoints offered by `weather configure`.
pub const SUGGESTED_WEATHER_BASE: &str =
    "https://api.openweathermap.org/data/2.5/weather?units=metric";
pub const SUGGESTED_GEOCODING_BASE: &str = "https://api.openweathermap.org/geo/1.0/direct?limit=5";

/// City searched once when the page is first mounted.
pub const FALLBACK_CITY: &str = "La Valletta";

const HISTORY_FILE_NAME: &str = "weatherSearchHistory.json";

/// Everything the weather client needs to talk to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    /// Base URL already carrying its own query string, e.g. `...?units=metric`.
    pub weather_base_endpoint: String,
    pub geocoding_base_endpoint: String,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// weather_base_endpoint = "https://api.openweathermap.org/data/2.5/weather?units=metric"
/// geocoding_base_endpoint = "https://api.openweathermap.org/geo/1.0/direct?limit=5"
/// default_city = "La Valletta"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub weather_base_endpoint: Option<String>,
    pub geocoding_base_endpoint: Option<String>,
    pub default_city: Option<String>,
    /// Overrides the platform data directory location of the history file.
    pub history_file: Option<PathBuf>,
}

impl Config {
    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Environment values win over whatever the file says. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_WEATHER_BASE) {
            self.weather_base_endpoint = Some(v);
        }
        if let Some(v) = get(ENV_GEOCODING_BASE) {
            self.geocoding_base_endpoint = Some(v);
        }
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where search history is persisted.
    pub fn history_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_file {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join(HISTORY_FILE_NAME))
    }

    pub fn default_city(&self) -> &str {
        self.default_city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(FALLBACK_CITY)
    }

    /// Client settings; every field is required before any request can succeed.
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig {
            api_key: required(&self.api_key, "API key", ENV_API_KEY)?,
            weather_base_endpoint: required(
                &self.weather_base_endpoint,
                "weather base endpoint",
                ENV_WEATHER_BASE,
            )?,
            geocoding_base_endpoint: required(
                &self.geocoding_base_endpoint,
                "geocoding base endpoint",
                ENV_GEOCODING_BASE,
            )?,
        })
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

fn required(value: &Option<String>, what: &str, env: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "No {what} configured.\n\
                 Hint: run `weather configure` or set {env}."
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Config {
        Config {
            api_key: Some("KEY".into()),
            weather_base_endpoint: Some("http://w/weather?units=metric".into()),
            geocoding_base_endpoint: Some("http://g/direct?limit=5".into()),
            ..Config::default()
        }
    }

    #[test]
    fn client_config_errors_when_key_missing() {
        let mut cfg = full();
        cfg.api_key = None;

        let err = cfg.client_config().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `weather configure`"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut cfg = full();
        cfg.geocoding_base_endpoint = Some("   ".into());

        let err = cfg.client_config().unwrap_err();
        assert!(err.to_string().contains("geocoding base endpoint"));
    }

    #[test]
    fn client_config_built_when_complete() {
        let client = full().client_config().expect("complete config");
        assert_eq!(client.api_key, "KEY");
        assert_eq!(client.weather_base_endpoint, "http://w/weather?units=metric");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = full();
        cfg.apply_env(|name| match name {
            ENV_API_KEY => Some("FROM_ENV".into()),
            ENV_WEATHER_BASE => Some(String::new()),
            _ => None,
        });

        assert_eq!(cfg.api_key.as_deref(), Some("FROM_ENV"));
        assert_eq!(cfg.weather_base_endpoint.as_deref(), Some("http://w/weather?units=metric"));
    }

    #[test]
    fn default_city_falls_back() {
        let mut cfg = Config::default();
        assert_eq!(cfg.default_city(), FALLBACK_CITY);

        cfg.default_city = Some("Lisbon".into());
        assert_eq!(cfg.default_city(), "Lisbon");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = full();
        cfg.default_city = Some("Tallinn".into());
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn history_file_override_is_respected() {
        let mut cfg = Config::default();
        cfg.history_file = Some(PathBuf::from("/tmp/h.json"));
        assert_eq!(cfg.history_file_path().expect("path"), PathBuf::from("/tmp/h.json"));
    }
}
