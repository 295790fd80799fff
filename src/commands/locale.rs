use std::sync::Arc;

use tourney_i18n::api::{ClientConfig, TranslationClient};
use tourney_i18n::config::Config;
use tourney_i18n::error::{Error, I18nErrorTrait, Result};
use tourney_i18n::facade::I18nError;
use tourney_i18n::loader::NamespaceLoader;
use tourney_i18n::locale::{self, Locale, Namespace};
use tourney_i18n::preference::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, UnavailableStore,
};
use tourney_i18n::resolver::{FixedLanguage, LanguageSource, LocaleResolver, SystemLanguage};
use tourney_i18n::I18n;

/// Parse a `name=value` placeholder argument
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid name=value pair: no '=' in '{s}'"))?;
    if name.trim().is_empty() {
        return Err(format!("invalid name=value pair: empty name in '{s}'"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

fn preference_store(config: &Config) -> Arc<dyn PreferenceStore> {
    match config.i18n.preference_path() {
        Some(path) => Arc::new(FilePreferenceStore::new(path)),
        None => Arc::new(UnavailableStore),
    }
}

/// List locales from the configuration or the locale API
pub async fn locales(config: &Config, remote: bool) -> Result<()> {
    let i18n = I18n::from_config(config)?;

    let (origin, infos) = if remote {
        let client = TranslationClient::new(ClientConfig::from(&config.client))
            .map_err(|e| Error::with_source("Failed to create locale API client", e))?;
        ("locale API", i18n.available_locales_from(&client).await)
    } else {
        ("configuration", i18n.available_locales())
    };

    println!("Available Locales ({origin})");
    println!("{:-<40}", "");
    for info in &infos {
        let mut markers = Vec::new();
        if info.code == i18n.locales().default_locale().as_str() {
            markers.push("default");
        }
        if info.code == i18n.fallback_locale().as_str() {
            markers.push("fallback");
        }
        if markers.is_empty() {
            println!("  {:<8} {}", info.code, info.name);
        } else {
            println!("  {:<8} {} ({})", info.code, info.name, markers.join(", "));
        }
    }

    Ok(())
}

/// Print the locale that startup resolution picks
pub fn resolve(config: &Config, lang: Option<String>) -> Result<()> {
    let locales = config.i18n.locale_set()?;
    let store = preference_store(config);
    let language: Arc<dyn LanguageSource> = match lang {
        Some(tag) => Arc::new(FixedLanguage::new(tag)),
        None => Arc::new(SystemLanguage),
    };

    let stored = store.get();
    let environment = language.language();
    let resolver = LocaleResolver::new(store, language, locales);

    println!("Stored preference:    {}", stored.as_ref().map_or("-", Locale::as_str));
    println!("Environment language: {}", environment.as_deref().unwrap_or("-"));
    println!("Resolved locale:      {}", resolver.resolve());
    Ok(())
}

/// Validate, persist and report a locale change
pub async fn set_locale(config: &Config, code: &str) -> Result<()> {
    let i18n = I18n::from_config(config)?;
    i18n.initialize().await;

    let result = match i18n.set_locale(code).await {
        Ok(locale) => {
            i18n.loader().load_namespace(&locale, Namespace::Settings).await;
            let name = locale::display_name(locale.as_str());
            println!(
                "{}",
                i18n.translate_with("settings.language.changed", &[("name", &name)])
            );
            Ok(())
        }
        Err(e) => {
            let err = Error::from(e);
            i18n.loader()
                .load_namespace(&i18n.active_locale(), Namespace::Validation)
                .await;
            eprintln!("{}", i18n.translate_with(err.message_key(), &[("code", code)]));
            Err(err)
        }
    };

    i18n.tasks().wait_idle().await;
    result
}

/// Translate one key, optionally in a given locale and after a navigation
pub async fn translate(
    config: &Config,
    key: &str,
    locale: Option<String>,
    route: Option<String>,
    args: &[(String, String)],
) -> Result<()> {
    let i18n = match locale {
        Some(code) => {
            let locales = config.i18n.locale_set()?;
            let locale = locales.lookup(&code).ok_or_else(|| I18nError::UnsupportedLocale {
                code: code.clone(),
                supported: locales.supported().iter().map(ToString::to_string).collect(),
            })?;
            let loader = Arc::new(NamespaceLoader::with_source(config.i18n.bundle_source()));
            I18n::new(
                locales,
                loader,
                Arc::new(MemoryPreferenceStore::with_locale(locale)),
                Arc::new(FixedLanguage::none()),
            )
        }
        None => I18n::from_config(config)?,
    };

    i18n.initialize().await;
    if let Some(route) = route {
        let outcome = i18n.navigate(&route).await;
        if !outcome.is_complete() {
            tracing::warn!(route = %route, missing = ?outcome.missing, "Some namespaces are unavailable");
        }
    }

    // Make sure the key's own namespace is loaded, whatever the route.
    if let Some(namespace) = key.split_once('.').and_then(|(ns, _)| ns.parse::<Namespace>().ok()) {
        i18n.loader().load_namespace(&i18n.active_locale(), namespace).await;
    }

    let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    println!("{}", i18n.translate_with(key, &args));

    i18n.tasks().wait_idle().await;
    Ok(())
}

/// Initialize, optionally navigate, and print cache statistics
pub async fn stats(config: &Config, route: Option<String>) -> Result<()> {
    let i18n = I18n::from_config(config)?;
    let state = i18n.initialize().await;

    if let Some(route) = route {
        i18n.navigate(&route).await;
    }
    i18n.tasks().wait_idle().await;

    println!("Active locale:   {}", state.locale);
    println!("Fallback locale: {}", state.fallback_locale);
    println!("Bundle source:   {}", i18n.loader().source_name());
    println!();
    println!("{}", i18n.loader().stats());
    println!();

    for locale in i18n.locales().supported() {
        let cached = i18n.loader().cached_for(locale);
        if cached.is_empty() {
            continue;
        }
        let names: Vec<&str> = cached.keys().map(|ns| ns.as_str()).collect();
        println!("{locale}: {}", names.join(", "));
    }

    Ok(())
}
