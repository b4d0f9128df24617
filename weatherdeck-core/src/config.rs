use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::Units;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Everything the OpenWeather provider needs, passed in at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// May be empty; the provider then rejects requests with its own auth error.
    pub api_key: String,
    pub base_url: String,
    pub icon_base_url: String,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides [`DEFAULT_BASE_URL`], mostly useful against a local mock.
    pub base_url: Option<String>,

    pub icon_base_url: Option<String>,

    /// Unit system used when none is given on the command line.
    pub units: Option<Units>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdeck", "weatherdeck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment if set, otherwise from the file.
    pub fn api_key(&self) -> Option<String> {
        env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn default_units(&self) -> Units {
        self.units.unwrap_or_default()
    }

    /// Resolve the explicit settings object handed to the provider.
    pub fn provider_settings(&self) -> ProviderSettings {
        self.settings_with_key(self.api_key())
    }

    fn settings_with_key(&self, api_key: Option<String>) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.unwrap_or_default(),
            base_url: self.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            icon_base_url: self
                .icon_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_ICON_BASE_URL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::default();
        let settings = cfg.settings_with_key(cfg.api_key.clone());

        assert_eq!(settings.api_key, "");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.icon_base_url, DEFAULT_ICON_BASE_URL);
        assert_eq!(cfg.default_units(), Units::Metric);
    }

    #[test]
    fn parses_toml_file_contents() {
        let cfg = Config::from_toml(
            r#"
            api_key = "OPEN_KEY"
            base_url = "http://localhost:9000"
            units = "imperial"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.api_key.as_deref(), Some("OPEN_KEY"));
        assert_eq!(cfg.default_units(), Units::Imperial);

        let settings = cfg.settings_with_key(cfg.api_key.clone());
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.icon_base_url, DEFAULT_ICON_BASE_URL);
    }

    #[test]
    fn rejects_unknown_units() {
        let err = Config::from_toml(r#"units = "kelvin""#).unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config { api_key: Some("K".into()), units: Some(Units::Imperial), ..Default::default() };

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.api_key.as_deref(), Some("K"));
        assert_eq!(back.units, Some(Units::Imperial));
    }

    #[test]
    fn settings_builder_overrides_base_url() {
        let settings = ProviderSettings::new("KEY").with_base_url("http://127.0.0.1:1234");
        assert_eq!(settings.api_key, "KEY");
        assert_eq!(settings.base_url, "http://127.0.0.1:1234");
    }
}
