//! Bundle sources
//!
//! The loader only needs "fetch by (locale, namespace), async, may fail".
//! [`EmbeddedSource`] resolves pairs through the compile-time registry;
//! [`DirectorySource`] reads JSON files laid out as `<root>/<locale>/<namespace>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::registry::{self, RegistryEntry};
use super::{BundleError, MessageBundle};
use crate::locale::{Locale, Namespace};

/// Read-only provider of message bundles
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the bundle for one pair
    async fn fetch(&self, locale: &Locale, namespace: Namespace) -> Result<MessageBundle, BundleError>;
}

/// Source backed by the compile-time registry
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub fn new() -> Self {
        Self
    }

    /// Every pair this source can serve
    pub fn entries(&self) -> &'static [RegistryEntry] {
        registry::ENTRIES
    }
}

#[async_trait]
impl BundleSource for EmbeddedSource {
    fn name(&self) -> &str {
        "embedded"
    }

    async fn fetch(&self, locale: &Locale, namespace: Namespace) -> Result<MessageBundle, BundleError> {
        let json = registry::lookup(locale.as_str(), namespace).ok_or_else(|| BundleError::NotFound {
            locale: locale.to_string(),
            namespace,
        })?;

        MessageBundle::from_json_str(json).map_err(|source| BundleError::Parse {
            locale: locale.to_string(),
            namespace,
            source,
        })
    }
}

/// Source reading bundle files from a directory tree
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a pair
    ///
    /// Components come from a normalized `Locale` and the `Namespace` enum,
    /// so the path can never escape `root`.
    pub fn bundle_path(&self, locale: &Locale, namespace: Namespace) -> PathBuf {
        self.root
            .join(locale.as_str())
            .join(format!("{}.json", namespace.as_str()))
    }
}

#[async_trait]
impl BundleSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn fetch(&self, locale: &Locale, namespace: Namespace) -> Result<MessageBundle, BundleError> {
        let path = self.bundle_path(locale, namespace);

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BundleError::NotFound {
                    locale: locale.to_string(),
                    namespace,
                });
            }
            Err(source) => return Err(BundleError::Io { path, source }),
        };

        MessageBundle::from_json_str(&text).map_err(|source| BundleError::Parse {
            locale: locale.to_string(),
            namespace,
            source,
        })
    }
}
