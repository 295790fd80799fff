//! Unified error handling for the tourney-i18n crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`I18nErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use tourney_i18n::error::{Error, I18nErrorTrait};
//!
//! fn report(err: &Error, i18n: &I18n) {
//!     if err.is_recoverable() {
//!         tracing::warn!("Retrying: {err}");
//!     } else {
//!         eprintln!("{}", i18n.translate(err.message_key()));
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::api::{ClientError, ServerError};
pub use crate::bundle::BundleError;
pub use crate::config::ConfigError;
pub use crate::facade::I18nError;
pub use crate::locale::LocaleError;

/// Common trait for tourney-i18n error types
pub trait I18nErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;

    /// Translation key (in the `messages` namespace) for user-facing text
    fn message_key(&self) -> &'static str {
        self.category().message_key()
    }
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backend and HTTP errors
    Network,
    /// Malformed bundles or responses
    Parsing,
    /// File and preference storage errors
    Storage,
    /// Configuration errors
    Config,
    /// Rejected user input
    Validation,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Translation key describing the category
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Network => "messages.network_error",
            Self::Parsing => "messages.error",
            Self::Storage => "messages.storage_error",
            Self::Config => "messages.config_error",
            Self::Validation => "messages.validation_error",
            Self::Other => "messages.error",
        }
    }
}

/// Unified error type for the tourney-i18n crate
#[derive(Error, Debug)]
pub enum Error {
    /// Bundle loading errors
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Locale switching errors
    #[error("i18n error: {0}")]
    I18n(#[from] I18nError),

    /// Malformed locale codes
    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    /// Locale API client errors
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Locale API server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl I18nErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Bundle(e) => e.is_recoverable(),
            Self::Client(e) => e.is_recoverable(),
            Self::I18n(_) | Self::Locale(_) | Self::Config(_) => false,
            Self::Server(e) => matches!(e, ServerError::Bind { .. }),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) => false,
            Self::Http(_) => true, // HTTP errors are often transient
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Bundle(e) => match e {
                BundleError::Parse { .. } => ErrorCategory::Parsing,
                BundleError::NotFound { .. } | BundleError::Io { .. } => ErrorCategory::Storage,
            },
            Self::Client(ClientError::Parse(_)) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Client(_) | Self::Http(_) | Self::Server(_) => ErrorCategory::Network,
            Self::I18n(_) | Self::Locale(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::I18n(e) => e.message_key(),
            _ => self.category().message_key(),
        }
    }
}

impl Error {
    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
