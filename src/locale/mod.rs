//! Locale and namespace identifiers
//!
//! A [`Locale`] is a normalized language-region code (`pt-BR`, `en-US`).
//! A [`Namespace`] is one of the fixed feature areas translation keys are
//! partitioned into. [`LocaleSet`] is the validated, configured view of which
//! locales the application offers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing locale or namespace identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The code is not a `language[-REGION]` style tag
    #[error("Malformed locale code: '{0}'")]
    Malformed(String),

    /// The namespace name is not one of the known namespaces
    #[error("Unknown namespace: '{0}'")]
    UnknownNamespace(String),
}

/// A normalized locale code such as `pt-BR`
///
/// The language subtag is lowercased, a two-letter region subtag is
/// uppercased and `_` separators are replaced by `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and normalize a locale code
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::Malformed` if the code is empty, has a language
    /// subtag that is not 2-3 ASCII letters, or contains non-alphanumeric
    /// subtags.
    pub fn parse(code: &str) -> Result<Self, LocaleError> {
        let trimmed = code.trim();
        let mut parts = trimmed.split(['-', '_']);

        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(LocaleError::Malformed(code.to_string()));
        }

        let mut normalized = language.to_ascii_lowercase();
        for part in parts {
            if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(LocaleError::Malformed(code.to_string()));
            }
            normalized.push('-');
            if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                normalized.push_str(&part.to_ascii_uppercase());
            } else {
                normalized.push_str(part);
            }
        }

        Ok(Self(normalized))
    }

    /// The normalized code
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`pt` for `pt-BR`)
    pub fn primary_subtag(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Named partition of translation keys, grouped by feature area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Common,
    Navigation,
    Events,
    Players,
    Matches,
    Ranking,
    Validation,
    Messages,
    Settings,
}

impl Namespace {
    /// Every known namespace
    pub const ALL: &'static [Namespace] = &[
        Namespace::Common,
        Namespace::Navigation,
        Namespace::Events,
        Namespace::Players,
        Namespace::Matches,
        Namespace::Ranking,
        Namespace::Validation,
        Namespace::Messages,
        Namespace::Settings,
    ];

    /// Namespaces needed before the first paint
    pub const COMMON: &'static [Namespace] =
        &[Namespace::Common, Namespace::Navigation, Namespace::Messages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Navigation => "navigation",
            Self::Events => "events",
            Self::Players => "players",
            Self::Matches => "matches",
            Self::Ranking => "ranking",
            Self::Validation => "validation",
            Self::Messages => "messages",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ns| ns.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LocaleError::UnknownNamespace(s.to_string()))
    }
}

/// Display entry for a selectable locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleInfo {
    pub code: String,
    pub name: String,
}

impl LocaleInfo {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Locales shipped with the application, in menu order
pub fn builtin_locales() -> Vec<LocaleInfo> {
    vec![
        LocaleInfo::new("pt-BR", "Português (BR)"),
        LocaleInfo::new("en-US", "English (US)"),
    ]
}

/// Display name for a code, falling back to the code itself
pub fn display_name(code: &str) -> String {
    builtin_locales()
        .into_iter()
        .find(|info| info.code.eq_ignore_ascii_case(code))
        .map(|info| info.name)
        .unwrap_or_else(|| code.to_string())
}

/// Validated set of supported locales with default and fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    infos: Vec<LocaleInfo>,
    supported: Vec<Locale>,
    default: Locale,
    fallback: Locale,
}

impl LocaleSet {
    /// Build a locale set
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::Malformed` for any unparsable code, or for a
    /// default/fallback locale that is not in `infos`.
    pub fn new(infos: Vec<LocaleInfo>, default: &str, fallback: &str) -> Result<Self, LocaleError> {
        let mut supported = Vec::with_capacity(infos.len());
        let mut normalized_infos = Vec::with_capacity(infos.len());
        for info in infos {
            let locale = Locale::parse(&info.code)?;
            if supported.contains(&locale) {
                continue;
            }
            normalized_infos.push(LocaleInfo::new(locale.as_str(), info.name));
            supported.push(locale);
        }

        let default = Locale::parse(default)?;
        let fallback = Locale::parse(fallback)?;
        if !supported.contains(&default) {
            return Err(LocaleError::Malformed(format!("{default} (default not supported)")));
        }
        if !supported.contains(&fallback) {
            return Err(LocaleError::Malformed(format!("{fallback} (fallback not supported)")));
        }

        Ok(Self {
            infos: normalized_infos,
            supported,
            default,
            fallback,
        })
    }

    pub fn infos(&self) -> &[LocaleInfo] {
        &self.infos
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn fallback_locale(&self) -> &Locale {
        &self.fallback
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.supported.contains(locale)
    }

    /// The supported locale spelled exactly `code`
    ///
    /// No normalization: `pt_br` or `PT-br` are not `pt-BR` here. Tags from
    /// the environment go through [`Locale::parse`] and matching instead.
    pub fn lookup(&self, code: &str) -> Option<Locale> {
        self.supported.iter().find(|l| l.as_str() == code).cloned()
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        let pt = Locale("pt-BR".to_string());
        let en = Locale("en-US".to_string());
        Self {
            infos: builtin_locales(),
            supported: vec![pt, en.clone()],
            default: en.clone(),
            fallback: en,
        }
    }
}
