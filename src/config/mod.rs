//! Configuration management for tourney-i18n
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. The supported locale list is read once at
//! startup; offering a single locale is just a one-entry list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::bundle::{BundleSource, DirectorySource, EmbeddedSource};
use crate::locale::{self, LocaleInfo, LocaleSet};
use crate::preference;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Locale and bundle configuration
    pub i18n: I18nConfig,

    /// Locale API server configuration
    pub server: ServerConfig,

    /// Locale API client configuration
    pub client: ClientSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Locale and bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locales offered to the user, in menu order
    pub supported_locales: Vec<LocaleInfo>,

    /// Locale used when nothing else matches
    pub default_locale: String,

    /// Locale consulted for keys missing in the active locale
    pub fallback_locale: String,

    /// Preference file path (defaults to the user config directory)
    pub preference_path: Option<PathBuf>,

    /// Do not persist the selected locale
    pub disable_persistence: bool,

    /// Read bundles from this directory instead of the embedded set
    pub bundle_dir: Option<PathBuf>,

    /// Drop the previous locale's bundles when switching
    pub clear_previous_on_switch: bool,
}

/// Locale API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS for the API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

/// Locale API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// API base URL; endpoints live under `<base_url>/i18n`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retry count for failed requests
    pub retry_count: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            supported_locales: locale::builtin_locales(),
            default_locale: String::from("en-US"),
            fallback_locale: String::from("en-US"),
            preference_path: None,
            disable_persistence: false,
            bundle_dir: None,
            clear_previous_on_switch: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:8000/api"),
            timeout_secs: 10,
            retry_count: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl I18nConfig {
    /// Validated locale set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the list is empty, a code is malformed, a code
    /// is listed twice, or the default/fallback locale is not in the list.
    pub fn locale_set(&self) -> std::result::Result<LocaleSet, ConfigError> {
        if self.supported_locales.is_empty() {
            return Err(ConfigError::MissingField {
                field: "i18n.supported_locales".to_string(),
            });
        }

        let mut seen = Vec::with_capacity(self.supported_locales.len());
        for info in &self.supported_locales {
            let parsed = locale::Locale::parse(&info.code)
                .map_err(|e| ConfigError::invalid("i18n.supported_locales", e.to_string()))?;
            if seen.contains(&parsed) {
                return Err(ConfigError::invalid(
                    "i18n.supported_locales",
                    format!("'{parsed}' is listed more than once"),
                ));
            }
            seen.push(parsed);
        }

        for (field, code) in [
            ("i18n.default_locale", &self.default_locale),
            ("i18n.fallback_locale", &self.fallback_locale),
        ] {
            let parsed =
                locale::Locale::parse(code).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
            if !seen.contains(&parsed) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{parsed}' is not in supported_locales"),
                ));
            }
        }

        LocaleSet::new(
            self.supported_locales.clone(),
            &self.default_locale,
            &self.fallback_locale,
        )
        .map_err(|e| ConfigError::invalid("i18n", e.to_string()))
    }

    /// Effective preference file path, if persistence is enabled
    pub fn preference_path(&self) -> Option<PathBuf> {
        if self.disable_persistence {
            return None;
        }
        self.preference_path
            .clone()
            .or_else(preference::default_preference_path)
    }

    /// Bundle source: `bundle_dir` if set, else the embedded bundles
    pub fn bundle_source(&self) -> Arc<dyn BundleSource> {
        match &self.bundle_dir {
            Some(dir) => Arc::new(DirectorySource::new(dir)),
            None => Arc::new(EmbeddedSource::new()),
        }
    }
}

impl ClientSettings {
    /// Get request timeout as Duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(list) = std::env::var("TOURNEY_SUPPORTED_LOCALES") {
            config.i18n.supported_locales = parse_locale_list(&list);
        }
        if let Ok(code) = std::env::var("TOURNEY_DEFAULT_LOCALE") {
            config.i18n.default_locale = code;
        }
        if let Ok(code) = std::env::var("TOURNEY_FALLBACK_LOCALE") {
            config.i18n.fallback_locale = code;
        }
        config.i18n.preference_path = std::env::var("TOURNEY_PREFERENCE_PATH").ok().map(PathBuf::from);
        config.i18n.bundle_dir = std::env::var("TOURNEY_BUNDLE_DIR").ok().map(PathBuf::from);
        config.i18n.disable_persistence = env_flag("TOURNEY_DISABLE_PERSISTENCE").unwrap_or(false);
        config.i18n.clear_previous_on_switch = env_flag("TOURNEY_CLEAR_PREVIOUS").unwrap_or(false);

        if let Ok(addr) = std::env::var("TOURNEY_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("Invalid TOURNEY_BIND_ADDRESS: {addr}"))?;
        }

        if let Ok(url) = std::env::var("TOURNEY_API_URL") {
            config.client.base_url = url;
        }
        config.client.timeout_secs = std::env::var("TOURNEY_API_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(config.client.timeout_secs);

        config.logging.level =
            std::env::var("TOURNEY_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        config.logging.format =
            std::env::var("TOURNEY_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.i18n.locale_set()?;

        url::Url::parse(&self.client.base_url)
            .with_context(|| format!("Invalid client.base_url: {}", self.client.base_url))?;

        if self.client.timeout_secs == 0 {
            anyhow::bail!("client.timeout_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}

/// Parse `pt-BR,en-US` (or `pt-BR=Português,en-US=English`) into locale infos
pub fn parse_locale_list(list: &str) -> Vec<LocaleInfo> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((code, name)) => LocaleInfo::new(code.trim(), name.trim()),
            None => LocaleInfo::new(entry, locale::display_name(entry)),
        })
        .collect()
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        let set = config.i18n.locale_set().unwrap();
        assert_eq!(set.supported().len(), 2);
        assert_eq!(set.default_locale().as_str(), "en-US");
    }

    #[test]
    fn test_empty_supported_locales() {
        let mut config = Config::default();
        config.i18n.supported_locales.clear();
        assert!(matches!(
            config.i18n.locale_set(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_default_must_be_supported() {
        let mut config = Config::default();
        config.i18n.default_locale = "fr-FR".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_locales_rejected() {
        let mut config = Config::default();
        config.i18n.supported_locales.push(LocaleInfo::new("pt_br", "Again"));
        assert!(config.i18n.locale_set().is_err());
    }

    #[test]
    fn test_single_locale_configuration() {
        let mut config = Config::default();
        config.i18n.supported_locales = parse_locale_list("pt-BR");
        config.i18n.default_locale = "pt-BR".to_string();
        config.i18n.fallback_locale = "pt-BR".to_string();
        let set = config.i18n.locale_set().unwrap();
        assert_eq!(set.infos()[0].name, "Português (BR)");
    }

    #[test]
    fn test_parse_locale_list() {
        let list = parse_locale_list("pt-BR=Português, en-US ,");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], LocaleInfo::new("pt-BR", "Português"));
        assert_eq!(list[1], LocaleInfo::new("en-US", "English (US)"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [i18n]
            default_locale = "pt-BR"

            [server]
            bind_address = "0.0.0.0:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.i18n.default_locale, "pt-BR");
        assert_eq!(config.i18n.fallback_locale, "en-US");
        assert_eq!(config.server.bind_address.port(), 9000);
        assert_eq!(config.client.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disable_persistence() {
        let mut config = Config::default();
        config.i18n.preference_path = Some(PathBuf::from("/tmp/prefs.json"));
        assert_eq!(config.i18n.preference_path(), Some(PathBuf::from("/tmp/prefs.json")));
        config.i18n.disable_persistence = true;
        assert_eq!(config.i18n.preference_path(), None);
    }
}
