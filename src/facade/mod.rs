//! i18n facade
//!
//! [`I18n`] is the single entry point the rendering layer talks to. It ties
//! together the resolver, the loader and the preference store:
//!
//! - `initialize` resolves the startup locale, awaits the common namespaces
//!   and loads everything else in the background
//! - `set_locale` validates, switches, persists and preloads
//! - `navigate` runs the navigation guard for the current route
//! - `translate` looks keys up in the active locale, then the fallback
//!
//! An `I18n` is constructed explicitly, once per application instance; there
//! is no global state, so tests build a fresh one each.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tourney_i18n::config::Config;
//! use tourney_i18n::facade::I18n;
//!
//! let i18n = I18n::from_config(&Config::default())?;
//! let state = i18n.initialize().await;
//! i18n.navigate("EventDetail").await;
//! println!("{}", i18n.translate("events.title"));
//! ```

pub mod tasks;

pub use tasks::BackgroundTasks;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::api::client::TranslationClient;
use crate::bundle::{self, MessageBundle};
use crate::config::{Config, ConfigError};
use crate::loader::{NamespaceLoader, NamespaceMap};
use crate::locale::{Locale, LocaleInfo, LocaleSet, Namespace};
use crate::preference::{FilePreferenceStore, PreferenceStore, UnavailableStore};
use crate::resolver::{LanguageSource, LocaleResolver, SystemLanguage};
use crate::routes::{self, NavigationGuard, NavigationOutcome};

/// Errors reported to callers of user-initiated i18n actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// The requested locale is malformed or not offered
    #[error("Unsupported locale '{code}' (supported: {})", supported.join(", "))]
    UnsupportedLocale { code: String, supported: Vec<String> },
}

impl I18nError {
    /// Translation key describing this error to the user
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::UnsupportedLocale { .. } => "validation.invalid_locale",
        }
    }
}

/// Snapshot returned by `initialize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveState {
    pub locale: Locale,
    pub fallback_locale: Locale,
    /// Namespaces loaded before `initialize` returned
    pub loaded: Vec<Namespace>,
}

/// Currently loaded messages for the active and fallback locales
#[derive(Debug, Clone)]
pub struct ActiveMessages {
    pub locale: Locale,
    pub fallback_locale: Locale,
    pub bundles: NamespaceMap,
    pub fallback_bundles: NamespaceMap,
}

impl ActiveMessages {
    /// Look up `namespace.key`, active locale first
    pub fn get(&self, key: &str) -> Option<&str> {
        let (namespace, inner) = split_key(key)?;
        lookup_in(&self.bundles, namespace, inner).or_else(|| lookup_in(&self.fallback_bundles, namespace, inner))
    }
}

fn split_key(key: &str) -> Option<(Namespace, &str)> {
    let (namespace, inner) = key.split_once('.')?;
    Some((namespace.parse().ok()?, inner))
}

fn lookup_in<'a>(bundles: &'a NamespaceMap, namespace: Namespace, key: &str) -> Option<&'a str> {
    bundles.get(&namespace).and_then(|bundle| bundle.get(key))
}

#[derive(Debug)]
struct FacadeState {
    active: Locale,
    route: Option<String>,
}

/// Application-wide translation facade
pub struct I18n {
    locales: LocaleSet,
    loader: Arc<NamespaceLoader>,
    store: Arc<dyn PreferenceStore>,
    resolver: LocaleResolver,
    guard: NavigationGuard,
    state: RwLock<FacadeState>,
    clear_previous_on_switch: bool,
    tasks: BackgroundTasks,
}

impl I18n {
    /// Create a facade; the active locale is the default until `initialize`
    pub fn new(
        locales: LocaleSet,
        loader: Arc<NamespaceLoader>,
        store: Arc<dyn PreferenceStore>,
        language: Arc<dyn LanguageSource>,
    ) -> Self {
        let resolver = LocaleResolver::new(Arc::clone(&store), language, locales.clone());
        let guard = NavigationGuard::new(Arc::clone(&loader));
        let state = RwLock::new(FacadeState {
            active: locales.default_locale().clone(),
            route: None,
        });

        Self {
            locales,
            loader,
            store,
            resolver,
            guard,
            state,
            clear_previous_on_switch: false,
            tasks: BackgroundTasks::new(),
        }
    }

    /// Build from configuration, with the system language as environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the locale configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let locales = config.i18n.locale_set()?;

        let store: Arc<dyn PreferenceStore> = match config.i18n.preference_path() {
            Some(path) => Arc::new(FilePreferenceStore::new(path)),
            None => Arc::new(UnavailableStore),
        };

        let loader = Arc::new(NamespaceLoader::with_source(config.i18n.bundle_source()));

        Ok(Self::new(locales, loader, store, Arc::new(SystemLanguage))
            .with_clear_previous_on_switch(config.i18n.clear_previous_on_switch))
    }

    /// Drop the previous locale's bundles on every switch
    pub fn with_clear_previous_on_switch(mut self, enabled: bool) -> Self {
        self.clear_previous_on_switch = enabled;
        self
    }

    fn read_state(&self) -> RwLockReadGuard<'_, FacadeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, FacadeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the startup locale and load what the first paint needs
    ///
    /// Returns once the common namespaces are loaded for the active locale
    /// (and the fallback locale, when different). Every other namespace is
    /// loaded for both locales in the background.
    pub async fn initialize(&self) -> ActiveState {
        let resolver = self.resolver.clone();
        let locale = match tokio::task::spawn_blocking(move || resolver.resolve()).await {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(error = %e, "Locale resolution task failed, using default");
                self.locales.default_locale().clone()
            }
        };
        let fallback = self.locales.fallback_locale().clone();
        self.write_state().active = locale.clone();

        if fallback == locale {
            self.loader.preload_common(&locale).await;
        } else {
            futures::join!(
                self.loader.preload_common(&locale),
                self.loader.preload_common(&fallback)
            );
        }

        self.spawn_background_load(&locale);
        if fallback != locale {
            self.spawn_background_load(&fallback);
        }

        tracing::info!(locale = %locale, fallback = %fallback, "i18n initialized");

        ActiveState {
            locale,
            fallback_locale: fallback,
            loaded: Namespace::COMMON.to_vec(),
        }
    }

    /// Switch the active locale
    ///
    /// An unsupported code is reported and changes nothing. Otherwise the
    /// locale becomes active, is persisted, and the common namespaces plus
    /// those of the current route are loaded before returning; the remaining
    /// namespaces load in the background and their failures are only logged.
    pub async fn set_locale(&self, code: &str) -> Result<Locale, I18nError> {
        let Some(locale) = self.locales.lookup(code) else {
            tracing::warn!(code = code, "Rejected unsupported locale");
            return Err(I18nError::UnsupportedLocale {
                code: code.to_string(),
                supported: self.locales.supported().iter().map(ToString::to_string).collect(),
            });
        };

        let (previous, route) = {
            let mut state = self.write_state();
            let previous = std::mem::replace(&mut state.active, locale.clone());
            (previous, state.route.clone())
        };

        self.persist(&locale).await;

        if self.clear_previous_on_switch
            && previous != locale
            && &previous != self.locales.fallback_locale()
        {
            self.loader.clear_cache(Some(&previous));
        }

        let mut required = Namespace::COMMON.to_vec();
        if let Some(route) = route.as_deref() {
            for ns in routes::namespaces_for_route(route) {
                if !required.contains(ns) {
                    required.push(*ns);
                }
            }
        }
        self.loader.load_namespaces(&locale, &required).await;
        self.spawn_background_load(&locale);

        tracing::info!(previous = %previous, locale = %locale, "Locale changed");
        Ok(locale)
    }

    async fn persist(&self, locale: &Locale) {
        let store = Arc::clone(&self.store);
        let locale = locale.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || store.set(&locale)).await {
            tracing::warn!(error = %e, "Preference write task failed");
        }
    }

    /// Record the destination route and preload its namespaces
    pub async fn navigate(&self, route: &str) -> NavigationOutcome {
        let locale = {
            let mut state = self.write_state();
            state.route = Some(route.to_string());
            state.active.clone()
        };
        self.guard.before_navigate(&locale, route).await
    }

    fn spawn_background_load(&self, locale: &Locale) {
        let loader = Arc::clone(&self.loader);
        let locale = locale.clone();

        self.tasks.spawn(format!("load-all:{locale}"), async move {
            let loaded = loader.load_namespaces(&locale, Namespace::ALL).await;
            let empty: Vec<&str> = loaded
                .iter()
                .filter(|(_, bundle)| bundle.is_empty())
                .map(|(ns, _)| ns.as_str())
                .collect();

            if empty.is_empty() {
                Ok(())
            } else {
                Err(format!("no messages for {locale} in: {}", empty.join(", ")))
            }
        });
    }

    /// Locales offered to the user, from configuration
    pub fn available_locales(&self) -> Vec<LocaleInfo> {
        self.locales.infos().to_vec()
    }

    /// Locales offered by the backend, or the configured list if it fails
    pub async fn available_locales_from(&self, client: &TranslationClient) -> Vec<LocaleInfo> {
        match client.fetch_locales().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                tracing::warn!("Backend returned no locales, using configured list");
                self.available_locales()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch locales from backend, using configured list");
                self.available_locales()
            }
        }
    }

    pub fn active_locale(&self) -> Locale {
        self.read_state().active.clone()
    }

    pub fn fallback_locale(&self) -> &Locale {
        self.locales.fallback_locale()
    }

    pub fn current_route(&self) -> Option<String> {
        self.read_state().route.clone()
    }

    /// Messages loaded so far for the active and fallback locales
    pub fn messages(&self) -> ActiveMessages {
        let locale = self.active_locale();
        let fallback = self.locales.fallback_locale().clone();
        ActiveMessages {
            bundles: self.loader.cached_for(&locale),
            fallback_bundles: if fallback == locale {
                NamespaceMap::new()
            } else {
                self.loader.cached_for(&fallback)
            },
            locale,
            fallback_locale: fallback,
        }
    }

    /// Bundle for one namespace of the active locale, if loaded
    pub fn bundle(&self, namespace: Namespace) -> Option<Arc<MessageBundle>> {
        self.loader.cached(&self.active_locale(), namespace)
    }

    /// Translate `namespace.key`
    ///
    /// Falls back to the fallback locale, then to the key itself, so a
    /// missing translation shows up as the raw key rather than an error.
    pub fn translate(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    /// Translate and fill `{name}` placeholders
    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        match self.lookup(key) {
            Some(template) => bundle::interpolate(&template, args),
            None => key.to_string(),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let (namespace, inner) = split_key(key)?;
        let active = self.active_locale();

        let from = |locale: &Locale| {
            self.loader
                .cached(locale, namespace)
                .and_then(|bundle| bundle.get(inner).map(str::to_string))
        };

        from(&active).or_else(|| {
            let fallback = self.locales.fallback_locale();
            if *fallback == active {
                None
            } else {
                from(fallback)
            }
        })
    }

    pub fn loader(&self) -> &Arc<NamespaceLoader> {
        &self.loader
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    /// Background loads started by this facade
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("locales", &self.locales)
            .field("state", &*self.read_state())
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}
