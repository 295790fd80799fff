//! Locale API server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::loader::NamespaceLoader;
use crate::locale::LocaleSet;

use super::handlers::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Supported locales
    pub locales: Arc<LocaleSet>,

    /// Bundle loader; the messages endpoint reads through its cache
    pub loader: Arc<NamespaceLoader>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(locales: LocaleSet, loader: Arc<NamespaceLoader>) -> Self {
        Self {
            locales: Arc::new(locales),
            loader,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Locale API Server
// ============================================================================

/// HTTP server for the locale API
pub struct LocaleApiServer {
    config: ServerConfig,
    state: AppState,
}

impl LocaleApiServer {
    /// Create a server from the application configuration
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        let locales = config
            .i18n
            .locale_set()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let loader = Arc::new(NamespaceLoader::with_source(config.i18n.bundle_source()));

        Ok(Self::with_state(config.server.clone(), AppState::new(locales, loader)))
    }

    /// Create a server around existing state
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!(address = %addr, locales = self.state.locales.supported().len(), "Starting locale API server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Locale API server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            locales: self.state.locales.supported().iter().map(ToString::to_string).collect(),
            default_locale: self.state.locales.default_locale().to_string(),
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub locales: Vec<String>,
    pub default_locale: String,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl std::fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Locale API Server")?;
        writeln!(f, "{:-<40}", "")?;
        writeln!(f, "Bind Address:    {}", self.bind_address)?;
        writeln!(f, "Locales:         {}", self.locales.join(", "))?;
        writeln!(f, "Default Locale:  {}", self.default_locale)?;
        writeln!(f, "CORS:            {}", if self.cors_enabled { "enabled" } else { "disabled" })?;
        write!(
            f,
            "Request Logging: {}",
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to bind to address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server error
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
