//! Message bundles and the sources they are fetched from
//!
//! A [`MessageBundle`] is the immutable key→string mapping for one
//! (locale, namespace) pair. Bundles are authored as JSON objects; nested
//! objects are flattened into dotted keys so `{"form": {"title": "..."}}`
//! is looked up as `form.title`.

pub mod registry;
pub mod source;

pub use source::{BundleSource, DirectorySource, EmbeddedSource};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

use crate::locale::Namespace;

/// Errors that can occur while fetching or parsing a bundle
#[derive(Error, Debug)]
pub enum BundleError {
    /// Nothing is registered for the requested pair
    #[error("No bundle for {locale}/{namespace}")]
    NotFound { locale: String, namespace: Namespace },

    /// Bundle file could not be read
    #[error("Failed to read bundle {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bundle content is not a valid message object
    #[error("Invalid bundle {locale}/{namespace}: {source}")]
    Parse {
        locale: String,
        namespace: Namespace,
        #[source]
        source: FormatError,
    },
}

/// Why a piece of JSON is not a message bundle
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bundle root must be a JSON object")]
    NotAnObject,

    #[error("array values are not supported (key '{key}')")]
    Array { key: String },
}

impl BundleError {
    /// Whether retrying the same fetch may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Immutable mapping from translation key to localized string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBundle {
    messages: BTreeMap<String, String>,
}

impl MessageBundle {
    /// An empty bundle, used when a load fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a bundle from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the text is not a JSON object or contains
    /// arrays.
    pub fn from_json_str(text: &str) -> Result<Self, FormatError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Build a bundle from a JSON value, flattening nested objects
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if `value` is not an object or contains arrays.
    pub fn from_value(value: &Value) -> Result<Self, FormatError> {
        let Value::Object(map) = value else {
            return Err(FormatError::NotAnObject);
        };

        let mut messages = BTreeMap::new();
        for (key, child) in map {
            flatten_into(&mut messages, key, child)?;
        }

        Ok(Self { messages })
    }

    /// Look up a message by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Approximate memory held by keys and values
    pub fn size_bytes(&self) -> usize {
        self.messages.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Owned copy of the key/value pairs
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.messages.clone()
    }
}

impl<K, V> FromIterator<(K, V)> for MessageBundle
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: &str, value: &Value) -> Result<(), FormatError> {
    match value {
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Null => {}
        Value::Array(_) => {
            return Err(FormatError::Array {
                key: prefix.to_string(),
            })
        }
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(out, &format!("{prefix}.{key}"), child)?;
            }
        }
    }
    Ok(())
}

/// Replace `{name}` placeholders with the matching argument
///
/// Placeholders without a matching argument are left untouched.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

    if args.is_empty() {
        return template.to_string();
    }

    let re = PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("Invalid regex pattern"));

    re.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        args.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| (*v).to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}
