//! Locale API server and client
//!
//! An optional backend for locale data, separate from the bundle loader.
//!
//! # Endpoints
//!
//! ```text
//! GET  /api/health
//! GET  /api/i18n/locales      -> { locales: [{ code, name }] }
//! GET  /api/i18n/messages     -> { locale, messages }   (Accept-Language)
//! POST /api/i18n/set-locale   -> { success, locale?, error? }
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tourney_i18n::api::{LocaleApiServer, TranslationClient, ClientConfig};
//!
//! let server = LocaleApiServer::new(&config)?;
//! server.start().await?;
//!
//! let client = TranslationClient::new(ClientConfig::new("http://127.0.0.1:8000/api"))?;
//! let messages = client.get_messages(Some("pt-BR")).await;
//! ```

pub mod client;
pub mod handlers;
pub mod server;
pub mod types;

pub use client::{ClientConfig, ClientError, TranslationClient};
pub use server::{AppState, LocaleApiServer, ServerError};
pub use types::{HealthResponse, LocalesResponse, MessagesResponse, SetLocaleRequest, SetLocaleResponse};
