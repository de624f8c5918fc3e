use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::CandidateLocation;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_SEARCH_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_REVERSE_URL: &str = "https://geocoding-api.open-meteo.com/v1/reverse";
pub const DEFAULT_IP_GEOLOCATION_URL: &str = "http://ip-api.com/json";

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub search: String,
    pub reverse: String,
    pub ip_geolocation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: DEFAULT_FORECAST_URL.to_string(),
            search: DEFAULT_SEARCH_URL.to_string(),
            reverse: DEFAULT_REVERSE_URL.to_string(),
            ip_geolocation: DEFAULT_IP_GEOLOCATION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            search: format!("{base}/v1/search"),
            reverse: format!("{base}/v1/reverse"),
            ip_geolocation: format!("{base}/json"),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// request_timeout_secs = 10
///
/// [default_location]
/// name = "Seattle"
/// admin1 = "Washington"
/// country = "United States"
/// latitude = 47.6062
/// longitude = -122.3321
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub debounce_millis: u64,

    pub endpoints: Endpoints,

    /// Place used instead of device geolocation on startup.
    pub default_location: Option<CandidateLocation>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            refresh_interval_secs: 600,
            debounce_millis: 300,
            endpoints: Endpoints::default(),
            default_location: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }

    /// Store a default location. Rejects candidates missing required fields.
    pub fn set_default_location(&mut self, candidate: CandidateLocation) -> Result<()> {
        if !candidate.is_valid() {
            return Err(anyhow!(
                "Location '{}' is missing coordinates, name or country",
                candidate.display_name()
            ));
        }
        self.default_location = Some(candidate);
        Ok(())
    }

    pub fn clear_default_location(&mut self) {
        self.default_location = None;
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Timeouts and the refresh period must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than 0");
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyclock", "skyclock")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
