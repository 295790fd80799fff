//! tourney-i18n - Translation loading for the tournament manager
//!
//! Locale selection, lazily loaded per-namespace message bundles and an
//! optional locale API for the tournament management client.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`locale`] - Locale and namespace identifiers, the configured locale set
//! - [`bundle`] - Message bundles and the sources they are fetched from
//! - [`loader`] - Namespace cache with in-flight request deduplication
//! - [`preference`] - Persistent storage of the selected locale
//! - [`resolver`] - Startup locale resolution
//! - [`routes`] - Route to namespace mapping and the navigation guard
//! - [`facade`] - The [`I18n`] entry point used by the rendering layer
//! - [`api`] - Optional locale API server and client
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use tourney_i18n::config::Config;
//! use tourney_i18n::I18n;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let i18n = I18n::from_config(&config)?;
//!     i18n.initialize().await;
//!     i18n.navigate("Events").await;
//!     println!("{}", i18n.translate("events.title"));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bundle;
pub mod config;
pub mod error;
pub mod facade;
pub mod loader;
pub mod locale;
pub mod preference;
pub mod resolver;
pub mod routes;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bundle::{BundleSource, MessageBundle};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, I18nErrorTrait, Result};
    pub use crate::facade::{I18n, I18nError};
    pub use crate::loader::NamespaceLoader;
    pub use crate::locale::{Locale, LocaleInfo, LocaleSet, Namespace};
    pub use crate::preference::PreferenceStore;
}

// Direct re-exports for convenience
pub use facade::I18n;
pub use locale::{Locale, Namespace};
