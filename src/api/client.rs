//! Locale API client
//!
//! Talks to the locale API server. Every public call degrades instead of
//! failing: messages fall back to an empty map, locales to the built-in list,
//! and a failed locale change is reported in the response body.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::ClientSettings;
use crate::locale::{self, LocaleInfo};

use super::types::{HealthResponse, LocalesResponse, MessagesResponse, SetLocaleRequest, SetLocaleResponse};

/// Cache key used when no locale is requested
const DEFAULT_CACHE_KEY: &str = "default";

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the locale API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL; endpoints live under `<base_url>/i18n`
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Retry count for failed requests
    pub retry_count: u32,

    /// Retry delay
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            retry_count: 2,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self::new(settings.base_url.clone())
            .with_timeout(settings.timeout())
            .with_retry_count(settings.retry_count)
    }
}

// ============================================================================
// Translation Client
// ============================================================================

/// Client for the locale API with a per-locale message cache
pub struct TranslationClient {
    config: ClientConfig,
    http_client: Client,
    cache: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl TranslationClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/i18n/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Messages for `locale` (server default when `None`)
    ///
    /// Successful responses are cached under the locale code, or `"default"`.
    /// Failures are logged and yield an empty map, which is not cached.
    pub async fn get_messages(&self, locale: Option<&str>) -> BTreeMap<String, String> {
        let cache_key = locale.unwrap_or(DEFAULT_CACHE_KEY);

        if let Some(messages) = self.cache.read().await.get(cache_key) {
            return messages.clone();
        }

        match self.fetch_messages(locale).await {
            Ok(response) => {
                self.cache
                    .write()
                    .await
                    .insert(cache_key.to_string(), response.messages.clone());
                response.messages
            }
            Err(e) => {
                tracing::error!(locale = ?locale, error = %e, "Failed to fetch localized messages");
                BTreeMap::new()
            }
        }
    }

    /// Uncached messages request
    pub async fn fetch_messages(&self, locale: Option<&str>) -> Result<MessagesResponse, ClientError> {
        let url = self.url("messages");
        self.send_with_retry(|| {
            let request = self.http_client.get(&url);
            match locale {
                Some(code) => request.header(reqwest::header::ACCEPT_LANGUAGE, code),
                None => request,
            }
        })
        .await
    }

    /// Locales offered by the server, or the built-in list on failure
    pub async fn get_available_locales(&self) -> Vec<LocaleInfo> {
        match self.fetch_locales().await {
            Ok(locales) => locales,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch available locales");
                locale::builtin_locales()
            }
        }
    }

    /// Uncached locales request
    pub async fn fetch_locales(&self) -> Result<Vec<LocaleInfo>, ClientError> {
        let url = self.url("locales");
        let response: LocalesResponse = self.send_with_retry(|| self.http_client.get(&url)).await?;
        Ok(response.locales)
    }

    /// Ask the server to accept `code`
    ///
    /// Any answer from the server clears the message cache. A transport
    /// failure is returned as `success: false` with the error text.
    pub async fn set_locale(&self, code: &str) -> SetLocaleResponse {
        let url = self.url("set-locale");
        let body = SetLocaleRequest {
            locale: Some(code.to_string()),
        };

        match self
            .send_with_retry::<SetLocaleResponse>(|| self.http_client.post(&url).json(&body))
            .await
        {
            Ok(response) => {
                self.clear_cache().await;
                response
            }
            Err(e) => {
                tracing::error!(code = code, error = %e, "Failed to set locale");
                SetLocaleResponse::rejected(e.to_string())
            }
        }
    }

    /// Server health
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        self.send_with_retry(|| self.http_client.get(&url)).await
    }

    /// Drop every cached message map
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Number of cached message maps
    pub async fn cached_entries(&self) -> usize {
        self.cache.read().await.len()
    }

    // Internal: send with retry. Client errors (4xx) are not retried.
    async fn send_with_retry<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T, ClientError> {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.json::<T>().await {
                            Ok(data) => return Ok(data),
                            Err(e) => last_error = Some(ClientError::Parse(e.to_string())),
                        }
                    } else {
                        let error = ClientError::Http {
                            status: status.as_u16(),
                            message: response.text().await.unwrap_or_default(),
                        };
                        if status.is_client_error() {
                            return Err(error);
                        }
                        last_error = Some(error);
                    }
                }
                Err(e) => last_error = Some(ClientError::Network(e.to_string())),
            }

            tracing::debug!(attempt = attempt + 1, error = ?last_error, "Locale API request failed");
        }

        Err(last_error.unwrap_or_else(|| ClientError::Network("Unknown error".to_string())))
    }
}

impl std::fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client Errors
// ============================================================================

/// Client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether retrying later may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Init(_) | Self::Parse(_) => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_creation() {
        let config = ClientConfig::new("http://localhost:8000/api");

        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.retry_count, 2);
    }

    #[test]
    fn test_client_config_from_settings() {
        let settings = ClientSettings {
            base_url: "http://example.test/api".to_string(),
            timeout_secs: 3,
            retry_count: 0,
        };
        let config = ClientConfig::from(&settings);

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry_count, 0);
    }

    #[test]
    fn test_url_building() {
        let client = TranslationClient::new(ClientConfig::new("http://localhost:8000/api/")).unwrap();
        assert_eq!(client.url("locales"), "http://localhost:8000/api/i18n/locales");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(ClientError::Network("refused".into()).is_recoverable());
        assert!(ClientError::Http { status: 503, message: String::new() }.is_recoverable());
        assert!(!ClientError::Http { status: 405, message: String::new() }.is_recoverable());
        assert!(!ClientError::Parse("bad".into()).is_recoverable());
    }
}
