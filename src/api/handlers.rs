//! REST API handlers for the locale server
//!
//! This module defines the routes and handlers for the locale API.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::locale::Namespace;
use crate::resolver::parse_accept_language;

use super::server::AppState;
use super::types::{HealthResponse, LocalesResponse, MessagesResponse, SetLocaleRequest, SetLocaleResponse};

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
///
/// Each path accepts a single verb; anything else gets 405 from axum.
pub fn create_router(state: AppState) -> Router {
    let i18n = Router::new()
        .route("/locales", get(get_locales))
        .route("/messages", get(get_messages))
        .route("/set-locale", post(set_locale));

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/i18n", i18n)
        .with_state(state)
}

// ============================================================================
// Health Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Locale Handlers
// ============================================================================

/// List the supported locales
async fn get_locales(State(state): State<AppState>) -> impl IntoResponse {
    Json(LocalesResponse {
        locales: state.locales.infos().to_vec(),
    })
}

/// API messages for the caller's preferred language
async fn get_messages(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    let locale = parse_accept_language(
        accept_language,
        state.locales.supported(),
        state.locales.default_locale(),
    );

    let bundle = state.loader.load_namespace(&locale, Namespace::Messages).await;
    tracing::debug!(
        accept_language = ?accept_language,
        locale = %locale,
        keys = bundle.len(),
        "Serving messages"
    );

    Json(MessagesResponse {
        locale: locale.to_string(),
        messages: bundle.to_map(),
    })
}

/// Validate a locale choice
async fn set_locale(
    State(state): State<AppState>,
    Json(request): Json<SetLocaleRequest>,
) -> impl IntoResponse {
    let code = request
        .locale
        .unwrap_or_else(|| state.locales.default_locale().to_string());

    match state.locales.lookup(&code) {
        Some(locale) => {
            tracing::info!(locale = %locale, "Locale accepted");
            Json(SetLocaleResponse::accepted(locale.to_string()))
        }
        None => {
            tracing::warn!(code = %code, "Locale rejected");
            Json(SetLocaleResponse::rejected(format!("Invalid locale: {code}")))
        }
    }
}
