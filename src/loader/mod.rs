//! Namespace cache and loader
//!
//! The loader owns the process-wide translation cache for one application
//! instance:
//! - Loaded bundles keyed by (locale, namespace), kept until cleared
//! - At most one in-flight fetch per key; concurrent callers share it
//! - Failed fetches degrade to an empty bundle and are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use tourney_i18n::bundle::EmbeddedSource;
//! use tourney_i18n::loader::NamespaceLoader;
//! use tourney_i18n::locale::{Locale, Namespace};
//!
//! let loader = NamespaceLoader::new(EmbeddedSource::new());
//! let locale = Locale::parse("pt-BR")?;
//! let events = loader.load_namespace(&locale, Namespace::Events).await;
//! println!("{:?}", events.get("title"));
//! ```

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bundle::{BundleSource, MessageBundle};
use crate::locale::{Locale, Namespace};
use crate::routes;

/// Bundles for several namespaces of one locale
pub type NamespaceMap = BTreeMap<Namespace, Arc<MessageBundle>>;

type LoadFuture = Shared<BoxFuture<'static, Arc<MessageBundle>>>;

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub locale: Locale,
    pub namespace: Namespace,
}

impl CacheKey {
    pub fn new(locale: Locale, namespace: Namespace) -> Self {
        Self { locale, namespace }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.locale, self.namespace)
    }
}

struct InFlight {
    id: u64,
    future: LoadFuture,
}

#[derive(Default)]
struct LoaderState {
    cache: HashMap<CacheKey, Arc<MessageBundle>>,
    in_flight: HashMap<CacheKey, InFlight>,
}

fn lock(state: &Mutex<LoaderState>) -> MutexGuard<'_, LoaderState> {
    // The state is only ever mutated with plain map operations, so a poisoned
    // lock still holds consistent data.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached bundles
    pub entries: usize,
    /// Loads currently in flight
    pub in_flight: usize,
    /// Approximate bytes held by cached keys and values
    pub size_bytes: usize,
    /// Fetches issued to the source since creation
    pub fetches: u64,
    /// Requests answered straight from the cache
    pub hits: u64,
}

impl CacheStats {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Translation Cache")?;
        writeln!(f, "{:-<30}", "")?;
        writeln!(f, "Entries:   {}", self.entries)?;
        writeln!(f, "In flight: {}", self.in_flight)?;
        writeln!(f, "Size:      {:.2} KB", self.size_kb())?;
        writeln!(f, "Fetches:   {}", self.fetches)?;
        write!(f, "Hits:      {}", self.hits)
    }
}

/// Loads message bundles on demand and caches them
pub struct NamespaceLoader {
    source: Arc<dyn BundleSource>,
    state: Arc<Mutex<LoaderState>>,
    next_id: AtomicU64,
    fetches: Arc<AtomicU64>,
    hits: AtomicU64,
}

impl NamespaceLoader {
    /// Create a loader with an empty cache
    pub fn new(source: impl BundleSource + 'static) -> Self {
        Self::with_source(Arc::new(source))
    }

    /// Create a loader over a shared source
    pub fn with_source(source: Arc<dyn BundleSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(LoaderState::default())),
            next_id: AtomicU64::new(1),
            fetches: Arc::new(AtomicU64::new(0)),
            hits: AtomicU64::new(0),
        }
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Load one namespace
    ///
    /// Returns the cached bundle if present, joins an in-flight load for the
    /// same key if there is one, and otherwise starts a fetch. Never fails:
    /// a fetch error is logged and yields an empty bundle.
    pub async fn load_namespace(&self, locale: &Locale, namespace: Namespace) -> Arc<MessageBundle> {
        let key = CacheKey::new(locale.clone(), namespace);

        let future = {
            let mut state = lock(&self.state);

            if let Some(bundle) = state.cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %key, "Bundle cache hit");
                return Arc::clone(bundle);
            }

            match state.in_flight.get(&key) {
                Some(in_flight) => {
                    tracing::debug!(key = %key, "Joining in-flight bundle load");
                    in_flight.future.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let future = self.start_fetch(key.clone(), id);
                    state.in_flight.insert(
                        key,
                        InFlight {
                            id,
                            future: future.clone(),
                        },
                    );
                    future
                }
            }
        };

        future.await
    }

    fn start_fetch(&self, key: CacheKey, id: u64) -> LoadFuture {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let fetches = Arc::clone(&self.fetches);

        async move {
            fetches.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, source = source.name(), "Fetching bundle");

            let result = source.fetch(&key.locale, key.namespace).await;

            // A load whose marker was removed by `clear_cache` must not
            // repopulate the cache.
            let still_current = {
                let mut state = lock(&state);
                let current = state.in_flight.get(&key).is_some_and(|f| f.id == id);
                if current {
                    state.in_flight.remove(&key);
                }
                current
            };

            match result {
                Ok(bundle) => {
                    let bundle = Arc::new(bundle);
                    if still_current {
                        lock(&state).cache.insert(key.clone(), Arc::clone(&bundle));
                        tracing::debug!(key = %key, messages = bundle.len(), "Bundle cached");
                    } else {
                        tracing::debug!(key = %key, "Cache cleared during load, result not cached");
                    }
                    bundle
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to load bundle");
                    Arc::new(MessageBundle::empty())
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Load several namespaces of one locale concurrently
    ///
    /// Never fails; namespaces whose load failed map to an empty bundle.
    pub async fn load_namespaces(&self, locale: &Locale, namespaces: &[Namespace]) -> NamespaceMap {
        let loads = namespaces.iter().map(|ns| async move { (*ns, self.load_namespace(locale, *ns).await) });

        join_all(loads).await.into_iter().collect()
    }

    /// Load the namespaces needed for the first paint
    pub async fn preload_common(&self, locale: &Locale) -> NamespaceMap {
        self.load_namespaces(locale, Namespace::COMMON).await
    }

    /// Load the namespaces a route needs; unknown routes load nothing
    pub async fn preload_for_route(&self, locale: &Locale, route: &str) -> NamespaceMap {
        let namespaces = routes::namespaces_for_route(route);
        if namespaces.is_empty() {
            return NamespaceMap::new();
        }
        self.load_namespaces(locale, namespaces).await
    }

    /// Cached bundle without loading
    pub fn cached(&self, locale: &Locale, namespace: Namespace) -> Option<Arc<MessageBundle>> {
        lock(&self.state)
            .cache
            .get(&CacheKey::new(locale.clone(), namespace))
            .cloned()
    }

    /// All cached bundles of a locale
    pub fn cached_for(&self, locale: &Locale) -> NamespaceMap {
        lock(&self.state)
            .cache
            .iter()
            .filter(|(key, _)| &key.locale == locale)
            .map(|(key, bundle)| (key.namespace, Arc::clone(bundle)))
            .collect()
    }

    pub fn is_cached(&self, locale: &Locale, namespace: Namespace) -> bool {
        self.cached(locale, namespace).is_some()
    }

    /// Remove cached entries for `locale`, or everything when `None`
    ///
    /// In-flight loads for the cleared keys are forgotten: later callers start
    /// a fresh fetch and the old load does not write back. Returns the number
    /// of cached bundles removed.
    pub fn clear_cache(&self, locale: Option<&Locale>) -> usize {
        let mut state = lock(&self.state);
        let before = state.cache.len();

        match locale {
            Some(locale) => {
                state.cache.retain(|key, _| &key.locale != locale);
                state.in_flight.retain(|key, _| &key.locale != locale);
            }
            None => {
                state.cache.clear();
                state.in_flight.clear();
            }
        }

        let removed = before - state.cache.len();
        tracing::info!(
            locale = locale.map(Locale::as_str).unwrap_or("*"),
            removed = removed,
            "Cleared translation cache"
        );
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        CacheStats {
            entries: state.cache.len(),
            in_flight: state.in_flight.len(),
            size_bytes: state.cache.values().map(|b| b.size_bytes()).sum(),
            fetches: self.fetches.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for NamespaceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceLoader")
            .field("source", &self.source.name())
            .field("stats", &self.stats())
            .finish()
    }
}
