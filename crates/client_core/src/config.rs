use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/shorten";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_CONFIG_FILE: &str = "shortener-admin.toml";

pub const BASE_URL_ENV: &str = "SHORTENER_ADMIN_BASE_URL";
pub const APP_BASE_URL_ENV: &str = "APP__BASE_URL";
pub const LOG_FILTER_ENV: &str = "SHORTENER_ADMIN_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid base url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub base_url: String,
    pub log_filter: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl AdminSettings {
    /// Validated form of `base_url`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
        self
    }
}

/// Loads settings from the process environment.
pub fn load_settings(
    config_path: Option<&Path>,
    base_url_override: Option<String>,
) -> Result<AdminSettings, ConfigError> {
    load_settings_with(config_path, base_url_override, |name| std::env::var(name).ok())
}

/// Defaults, then the TOML file, then environment overrides, then the
/// command-line base URL. Only the final base URL is validated.
///
/// An explicitly requested file must exist; the default `./shortener-admin.toml`
/// is optional.
pub fn load_settings_with(
    config_path: Option<&Path>,
    base_url_override: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AdminSettings, ConfigError> {
    let mut settings = match config_path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_settings_file(default_path)?
            } else {
                AdminSettings::default()
            }
        }
    };

    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty(APP_BASE_URL_ENV) {
        settings.base_url = v;
    }
    if let Some(v) = non_empty(BASE_URL_ENV) {
        settings.base_url = v;
    }
    if let Some(v) = non_empty(LOG_FILTER_ENV) {
        settings.log_filter = v;
    }

    let settings = settings.with_base_url_override(base_url_override);
    parse_base_url(&settings.base_url)?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<AdminSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot be used as a base".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
