//! Wire types shared by the locale API server and client

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::locale::LocaleInfo;

/// `GET /api/i18n/locales`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalesResponse {
    pub locales: Vec<LocaleInfo>,
}

/// `GET /api/i18n/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub locale: String,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

/// `POST /api/i18n/set-locale` body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLocaleRequest {
    /// Missing means the default locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// `POST /api/i18n/set-locale` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLocaleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetLocaleResponse {
    pub fn accepted(locale: impl Into<String>) -> Self {
        Self {
            success: true,
            locale: Some(locale.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            locale: None,
            error: Some(error.into()),
        }
    }
}

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_locale_response_omits_empty_fields() {
        let json = serde_json::to_value(SetLocaleResponse::accepted("pt-BR")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "locale": "pt-BR"}));

        let json = serde_json::to_value(SetLocaleResponse::rejected("Invalid locale: xx")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Invalid locale: xx"}));
    }

    #[test]
    fn test_set_locale_request_field_is_optional() {
        let request: SetLocaleRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.locale, None);
    }
}
