// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::form::DEFAULT_BANNER_TIMEOUT_MS;

pub const APP_NAME: &str = "fx-convert";
pub const API_KEY_ENV: &str = "EXCHANGE_RATE_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub countries_url: String,
    pub rates_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub banner_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_url: "https://restcountries.com/v3.1/all?fields=name,currencies,flags"
                .to_string(),
            rates_base_url: "https://v6.exchangerate-api.com/v6".to_string(),
            api_key: None,
            banner_timeout_ms: DEFAULT_BANNER_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .with_context(|| format!("{} must be set", API_KEY_ENV))
    }

    /// A non-empty key from the environment wins over the file
    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.api_key = Some(key);
        }
    }
}

/// Read the config from `path`, or from the per-user location when no path
/// is given, then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => confy::load(APP_NAME, None).context("Failed to load user config")?,
    };
    config.apply_env(env::var(API_KEY_ENV).ok());
    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let config_str = toml::to_string_pretty(config)?;
    fs::write(path, config_str).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.countries_url.ends_with("fields=name,currencies,flags"));
        assert_eq!(config.banner_timeout(), Duration::from_millis(3000));
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_default_timeout_matches_form_default() {
        assert_eq!(
            Config::default().banner_timeout(),
            crate::form::DEFAULT_BANNER_TIMEOUT
        );
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "banner_timeout_ms = 5000\napi_key = \"abc\"\n")?;

        let config = load_config_file(&path)?;
        assert_eq!(config.banner_timeout_ms, 5000);
        assert_eq!(config.require_api_key()?, "abc");
        assert_eq!(config.rates_base_url, Config::default().rates_base_url);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");

        let config = Config {
            rates_base_url: "http://localhost:8080/v6".to_string(),
            ..Config::default()
        };
        save_config(&config, &path)?;

        let written = fs::read_to_string(&path)?;
        assert!(!written.contains("api_key"));
        assert_eq!(load_config_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_env_key_overrides_file() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };

        config.apply_env(Some(String::new()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));

        config.apply_env(Some("from-env".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_file(&dir.path().join("absent.toml")).is_err());
    }
}
