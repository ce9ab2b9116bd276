use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::{
    error::WeatherError,
    model::{DEFAULT_CITY, DEFAULT_DAYS, MAX_DAYS, MIN_DAYS},
};

/// Environment variable consulted before the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Berlin,DE"
/// default_days = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the provider base URL, mostly useful for testing.
    pub base_url: Option<String>,

    pub default_city: Option<String>,
    pub default_days: Option<u8>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Resolve the API key, preferring `env_api_key` (normally the value of
    /// [`API_KEY_ENV`]) over the stored one. Blank values count as missing.
    pub fn resolve_api_key(&self, env_api_key: Option<String>) -> Result<String, WeatherError> {
        let usable =
            |key: Option<&str>| key.map(str::trim).filter(|k| !k.is_empty()).map(str::to_string);

        usable(env_api_key.as_deref())
            .or_else(|| usable(self.api_key.as_deref()))
            .ok_or_else(missing_api_key)
    }

    pub fn default_city(&self) -> &str {
        self.default_city.as_deref().filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CITY)
    }

    pub fn default_days(&self) -> u8 {
        self.default_days.unwrap_or(DEFAULT_DAYS).clamp(MIN_DAYS, MAX_DAYS)
    }
}

fn missing_api_key() -> WeatherError {
    WeatherError::Configuration(format!(
        "OpenWeatherMap API key not found!\n\
         You can get a free API key from: https://openweathermap.org/\n\
         Hint: run `weatherdash configure` and enter your API key, \
         or export {API_KEY_ENV}."
    ))
}
