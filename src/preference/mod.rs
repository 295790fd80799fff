//! Persistent locale preference
//!
//! Stores the last selected locale so the next start can restore it. Storage
//! is best effort: a missing or broken store reads as "no preference" and a
//! failed write is logged and ignored, since switching locale must keep
//! working in memory.
//!
//! Store calls are synchronous. Async callers run them on the blocking pool.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::locale::Locale;

/// Well-known key the locale is stored under
pub const LOCALE_KEY: &str = "locale";

/// Key-value storage for the selected locale
pub trait PreferenceStore: Send + Sync {
    /// Stored locale, or `None` when absent or unreadable
    fn get(&self) -> Option<Locale>;

    /// Store the locale; failures are logged, never returned
    fn set(&self, locale: &Locale);
}

/// Errors from the file-backed store
///
/// These never leave the store; they are logged and treated as "no
/// preference" on read or as a skipped write.
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid preference document {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
}

/// Preference store backed by a small JSON file
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory, if one exists
    pub fn in_config_dir() -> Option<Self> {
        default_preference_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn format_error(&self, source: serde_json::Error) -> PreferenceError {
        PreferenceError::Format {
            path: self.path.clone(),
            source,
        }
    }

    fn read_document(&self) -> Result<Option<PreferenceDocument>, PreferenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| self.format_error(e))
    }

    fn write_document(&self, document: &PreferenceDocument) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(document).map_err(|e| self.format_error(e))?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self) -> Option<Locale> {
        let document = match self.read_document() {
            Ok(document) => document?,
            Err(e) => {
                tracing::warn!(error = %e, "Preference storage not available");
                return None;
            }
        };

        let code = document.locale?;
        match Locale::parse(&code) {
            Ok(locale) => Some(locale),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring stored locale");
                None
            }
        }
    }

    fn set(&self, locale: &Locale) {
        let document = PreferenceDocument {
            locale: Some(locale.to_string()),
        };
        match self.write_document(&document) {
            Ok(()) => tracing::debug!(path = %self.path.display(), locale = %locale, "Locale preference saved"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist locale preference")
            }
        }
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<Locale>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: Locale) -> Self {
        Self {
            value: Mutex::new(Some(locale)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self) -> Option<Locale> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, locale: &Locale) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());
    }
}

/// Store used when persistence is disabled or unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn get(&self) -> Option<Locale> {
        None
    }

    fn set(&self, locale: &Locale) {
        tracing::debug!(locale = %locale, "Preference storage disabled, locale kept in memory only");
    }
}

/// `<config dir>/tourney-i18n/preferences.json`
pub fn default_preference_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tourney-i18n").join("preferences.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("nested").join("prefs.json"));

        assert_eq!(store.get(), None);
        store.set(&locale("pt-BR"));
        assert_eq!(store.get(), Some(locale("pt-BR")));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#""locale": "pt-BR""#));
    }

    #[test]
    fn test_file_store_corrupt_content_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_read_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FilePreferenceStore::new(&path).read_document().unwrap_err();
        assert!(matches!(err, PreferenceError::Format { .. }));
        assert!(err.to_string().contains("prefs.json"));

        // A directory where the file should be
        let err = FilePreferenceStore::new(dir.path()).read_document().unwrap_err();
        assert!(matches!(err, PreferenceError::Io { .. }));
    }

    #[test]
    fn test_file_store_malformed_locale_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"locale": "!!"}"#).unwrap();

        assert_eq!(FilePreferenceStore::new(&path).get(), None);
    }

    #[test]
    fn test_file_store_unwritable_location_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        // Parent "directory" is a regular file, so the write must fail quietly.
        let store = FilePreferenceStore::new(blocker.join("prefs.json"));
        store.set(&locale("en-US"));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get(), None);
        store.set(&locale("en-US"));
        assert_eq!(store.get(), Some(locale("en-US")));
    }

    #[test]
    fn test_unavailable_store() {
        let store = UnavailableStore;
        store.set(&locale("pt-BR"));
        assert_eq!(store.get(), None);
    }
}
