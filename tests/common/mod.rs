//! Common test utilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tourney_i18n::bundle::{BundleError, BundleSource, EmbeddedSource, MessageBundle};
use tourney_i18n::loader::NamespaceLoader;
use tourney_i18n::locale::{Locale, Namespace};

/// Embedded bundles with configurable failures, latency and fetch counting
#[derive(Default)]
pub struct ScriptedSource {
    inner: EmbeddedSource,
    failing: Vec<Namespace>,
    delay: Option<Duration>,
    fetches: Mutex<HashMap<(String, Namespace), usize>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch of `namespace` fails
    pub fn failing(mut self, namespace: Namespace) -> Self {
        self.failing.push(namespace);
        self
    }

    /// Every fetch sleeps first, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self, locale: &str, namespace: Namespace) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&(locale.to_string(), namespace))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl BundleSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, locale: &Locale, namespace: Namespace) -> Result<MessageBundle, BundleError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry((locale.to_string(), namespace))
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&namespace) {
            return Err(BundleError::NotFound {
                locale: locale.to_string(),
                namespace,
            });
        }

        self.inner.fetch(locale, namespace).await
    }
}

/// Loader over a shared scripted source
#[allow(dead_code)]
pub fn scripted_loader(source: ScriptedSource) -> (Arc<NamespaceLoader>, Arc<ScriptedSource>) {
    let source = Arc::new(source);
    let loader = Arc::new(NamespaceLoader::with_source(source.clone()));
    (loader, source)
}

pub fn locale(code: &str) -> Locale {
    Locale::parse(code).unwrap()
}
