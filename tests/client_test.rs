//! Integration tests for TranslationClient using wiremock
//!
//! These tests validate the client's caching and fallback behavior against a
//! mock locale API.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tourney_i18n::api::{ClientConfig, ClientError, TranslationClient};
use tourney_i18n::locale::builtin_locales;

fn client_for(server: &MockServer) -> TranslationClient {
    let config = ClientConfig::new(format!("{}/api", server.uri()))
        .with_timeout(Duration::from_secs(2))
        .with_retry_count(1)
        .with_retry_delay(Duration::from_millis(10));
    TranslationClient::new(config).unwrap()
}

/// Messages are fetched once per locale and then served from the cache
#[tokio::test]
async fn test_get_messages_is_cached_per_locale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/messages"))
        .and(header("accept-language", "pt-BR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locale": "pt-BR",
            "messages": {"success": "Sucesso"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.get_messages(Some("pt-BR")).await;
    let second = client.get_messages(Some("pt-BR")).await;

    assert_eq!(first.get("success").map(String::as_str), Some("Sucesso"));
    assert_eq!(first, second);
    assert_eq!(client.cached_entries().await, 1);
}

/// No locale means no Accept-Language header and the "default" cache key
#[tokio::test]
async fn test_get_messages_without_locale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locale": "en-US",
            "messages": {"success": "Success"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_messages(None).await;
    let messages = client.get_messages(None).await;

    assert_eq!(messages.get("success").map(String::as_str), Some("Success"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("accept-language").is_none());
}

/// Failures yield an empty map and are not cached
#[tokio::test]
async fn test_get_messages_failure_returns_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = client.get_messages(Some("en-US")).await;

    assert!(messages.is_empty());
    assert_eq!(client.cached_entries().await, 0);
}

/// Server errors are retried before succeeding
#[tokio::test]
async fn test_server_error_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/locales"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/locales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locales": [{"code": "pt-BR", "name": "Português (BR)"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locales = client.fetch_locales().await.unwrap();

    assert_eq!(locales.len(), 1);
    assert_eq!(locales[0].code, "pt-BR");
}

/// Client errors are not retried
#[tokio::test]
async fn test_client_error_no_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/locales"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_locales().await.unwrap_err();

    assert!(matches!(err, ClientError::Http { status: 405, .. }));
}

/// An unreachable backend falls back to the built-in locale list
#[tokio::test]
async fn test_available_locales_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/locales"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.get_available_locales().await, builtin_locales());
}

/// A locale change clears the message cache
#[tokio::test]
async fn test_set_locale_clears_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/i18n/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locale": "en-US",
            "messages": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/i18n/set-locale"))
        .and(body_json(json!({"locale": "pt-BR"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "locale": "pt-BR"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_messages(Some("en-US")).await;
    assert_eq!(client.cached_entries().await, 1);

    let response = client.set_locale("pt-BR").await;

    assert!(response.success);
    assert_eq!(response.locale.as_deref(), Some("pt-BR"));
    assert_eq!(client.cached_entries().await, 0);
}

/// A rejection from the server is passed through
#[tokio::test]
async fn test_set_locale_rejected_by_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/i18n/set-locale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Invalid locale: xx"
        })))
        .mount(&server)
        .await;

    let response = client_for(&server).set_locale("xx").await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Invalid locale: xx"));
}

/// Transport failures become an unsuccessful response, not an error
#[tokio::test]
async fn test_set_locale_transport_failure() {
    let config = ClientConfig::new("http://127.0.0.1:9/api")
        .with_timeout(Duration::from_millis(500))
        .with_retry_count(0);
    let client = TranslationClient::new(config).unwrap();

    let response = client.set_locale("pt-BR").await;

    assert!(!response.success);
    assert!(response.error.is_some_and(|e| !e.is_empty()));
}
