//! Startup locale resolution
//!
//! Precedence: stored preference (if supported), then the environment's
//! language matched on its primary subtag, then the configured default.
//! [`resolve`] is a pure function of its inputs; [`LocaleResolver`] only
//! gathers those inputs.
//!
//! # Environment Variables
//!
//! - `TOURNEY_LANG`: overrides the system language reported by the OS.

use std::sync::Arc;

use crate::locale::{Locale, LocaleSet};
use crate::preference::PreferenceStore;

/// Environment variable overriding the detected system language
pub const LANG_ENV: &str = "TOURNEY_LANG";

/// Pick the active locale
///
/// Same inputs always yield the same output; no I/O is performed.
pub fn resolve(
    stored: Option<&Locale>,
    environment_language: Option<&str>,
    supported: &[Locale],
    default: &Locale,
) -> Locale {
    if let Some(stored) = stored.filter(|l| supported.contains(l)) {
        return stored.clone();
    }

    environment_language
        .and_then(|tag| match_language_tag(tag, supported))
        .unwrap_or_else(|| default.clone())
}

/// Match a reported language tag against the supported locales
///
/// An exact match wins; otherwise the first supported locale sharing the
/// primary subtag is returned. POSIX suffixes such as `.UTF-8` or `@euro`
/// are ignored.
pub fn match_language_tag(tag: &str, supported: &[Locale]) -> Option<Locale> {
    let tag = tag.split(['.', '@']).next().unwrap_or_default().trim();
    if tag.is_empty() || tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }

    if let Ok(exact) = Locale::parse(tag) {
        if supported.contains(&exact) {
            return Some(exact);
        }
    }

    let primary = tag.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
    supported
        .iter()
        .find(|l| l.primary_subtag() == primary)
        .cloned()
}

/// Pick a locale from an `Accept-Language` header
///
/// Entries are tried in descending q-value order (ties keep header order);
/// a missing, empty or entirely unsupported header yields `default`.
pub fn parse_accept_language(header: Option<&str>, supported: &[Locale], default: &Locale) -> Locale {
    let Some(header) = header else {
        return default.clone();
    };

    let mut entries: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    entries
        .into_iter()
        .find_map(|(tag, _)| match_language_tag(tag, supported))
        .unwrap_or_else(|| default.clone())
}

/// Reports the environment's preferred language
pub trait LanguageSource: Send + Sync {
    fn language(&self) -> Option<String>;
}

/// `TOURNEY_LANG`, falling back to the operating system's locale
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLanguage;

impl LanguageSource for SystemLanguage {
    fn language(&self) -> Option<String> {
        std::env::var(LANG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(sys_locale::get_locale)
    }
}

/// Fixed language, for tests and explicit CLI overrides
#[derive(Debug, Clone, Default)]
pub struct FixedLanguage(pub Option<String>);

impl FixedLanguage {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Some(tag.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl LanguageSource for FixedLanguage {
    fn language(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Gathers resolution inputs from the preference store and environment
#[derive(Clone)]
pub struct LocaleResolver {
    store: Arc<dyn PreferenceStore>,
    language: Arc<dyn LanguageSource>,
    locales: LocaleSet,
}

impl LocaleResolver {
    pub fn new(store: Arc<dyn PreferenceStore>, language: Arc<dyn LanguageSource>, locales: LocaleSet) -> Self {
        Self {
            store,
            language,
            locales,
        }
    }

    pub fn resolve(&self) -> Locale {
        let stored = self.store.get();
        let environment = self.language.language();

        let locale = resolve(
            stored.as_ref(),
            environment.as_deref(),
            self.locales.supported(),
            self.locales.default_locale(),
        );

        tracing::debug!(
            stored = ?stored.as_ref().map(Locale::as_str),
            environment = ?environment,
            resolved = %locale,
            "Resolved locale"
        );
        locale
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }
}

impl std::fmt::Debug for LocaleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleResolver")
            .field("locales", &self.locales)
            .finish_non_exhaustive()
    }
}
