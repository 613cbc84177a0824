use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{cache::CityMatch, provider::openweather::DEFAULT_BASE_URL};

const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.env";

/// Cache location and freshness settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding `<CITY>_<lat>_<lon>.txt` files; platform cache dir when unset.
    pub dir: Option<PathBuf>,
    pub freshness_minutes: u64,
    #[serde(rename = "match")]
    pub city_match: CityMatch,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            freshness_minutes: 180,
            city_match: CityMatch::Exact,
        }
    }
}

impl CacheConfig {
    /// Saturates rather than overflowing on absurd `freshness_minutes`.
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_minutes.saturating_mul(60))
    }
}

/// OpenWeather endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout; `0` disables it.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub max_city_attempts: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_city_attempts: 5,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [cache]
/// freshness_minutes = 180
/// match = "exact"
///
/// [api]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Credential file location; `credentials.env` in the config dir when unset.
    pub credentials_file: Option<PathBuf>,
    pub cache: CacheConfig,
    pub api: ApiConfig,
    pub prompt: PromptConfig,
}

impl Config {
    /// Load config from the platform path, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
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
        Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.config_dir().join(CREDENTIALS_FILE)),
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.cache_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "cityweather", "cityweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
