//! Integration tests for the i18n facade

mod common;

use std::sync::Arc;

use common::{locale, scripted_loader, ScriptedSource};
use tourney_i18n::facade::{I18n, I18nError};
use tourney_i18n::locale::{LocaleSet, Namespace};
use tourney_i18n::preference::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use tourney_i18n::resolver::{FixedLanguage, LocaleResolver};

fn facade_with(store: Arc<dyn PreferenceStore>, language: FixedLanguage) -> I18n {
    let (loader, _) = scripted_loader(ScriptedSource::new());
    I18n::new(LocaleSet::default(), loader, store, Arc::new(language))
}

#[tokio::test]
async fn test_environment_language_selects_locale() {
    let i18n = facade_with(Arc::new(MemoryPreferenceStore::new()), FixedLanguage::new("pt-BR"));
    let state = i18n.initialize().await;
    assert_eq!(state.locale, locale("pt-BR"));

    let i18n = facade_with(Arc::new(MemoryPreferenceStore::new()), FixedLanguage::new("fr-FR"));
    let state = i18n.initialize().await;
    assert_eq!(state.locale, locale("en-US"));
}

#[tokio::test]
async fn test_stored_preference_beats_environment() {
    let store = Arc::new(MemoryPreferenceStore::with_locale(locale("pt-BR")));
    let i18n = facade_with(store, FixedLanguage::new("en-US"));

    let state = i18n.initialize().await;
    assert_eq!(state.locale, locale("pt-BR"));
    assert_eq!(i18n.active_locale(), locale("pt-BR"));
}

#[tokio::test]
async fn test_invalid_locale_changes_nothing() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let i18n = facade_with(store.clone(), FixedLanguage::new("en-US"));
    i18n.initialize().await;

    let result = i18n.set_locale("xx-INVALID").await;

    assert!(matches!(result, Err(I18nError::UnsupportedLocale { ref code, .. }) if code == "xx-INVALID"));
    assert_eq!(i18n.active_locale(), locale("en-US"));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_set_locale_rejects_unnormalized_spelling() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let i18n = facade_with(store.clone(), FixedLanguage::new("en-US"));
    i18n.initialize().await;

    assert!(i18n.set_locale("pt_br").await.is_err());
    assert_eq!(i18n.active_locale(), locale("en-US"));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_set_locale_persists_for_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::new(&path));
    let i18n = facade_with(Arc::clone(&store), FixedLanguage::new("en-US"));
    i18n.initialize().await;

    let active = i18n.set_locale("pt-BR").await.unwrap();
    assert_eq!(active, locale("pt-BR"));
    assert_eq!(i18n.active_locale(), locale("pt-BR"));
    i18n.tasks().wait_idle().await;

    // A fresh resolver over the same file picks the stored choice.
    let resolver = LocaleResolver::new(
        Arc::new(FilePreferenceStore::new(&path)),
        Arc::new(FixedLanguage::new("en-US")),
        LocaleSet::default(),
    );
    assert_eq!(resolver.resolve(), locale("pt-BR"));
}

#[tokio::test]
async fn test_initialize_then_switch_end_to_end() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let (loader, source) = scripted_loader(ScriptedSource::new());
    let i18n = I18n::new(
        LocaleSet::default(),
        loader,
        store.clone(),
        Arc::new(FixedLanguage::new("en-US")),
    );

    let state = i18n.initialize().await;
    assert_eq!(state.locale, locale("en-US"));
    assert_eq!(state.loaded, Namespace::COMMON);
    assert_eq!(i18n.translate("common.app.title"), "Tournament Manager");

    i18n.navigate("Players").await;
    i18n.set_locale("pt-BR").await.unwrap();

    // Common and route namespaces are ready as soon as set_locale returns.
    assert_eq!(i18n.translate("common.app.title"), "Gerenciador de Torneios");
    assert!(i18n.loader().is_cached(&locale("pt-BR"), Namespace::Players));

    i18n.tasks().wait_idle().await;
    for ns in Namespace::ALL {
        assert!(i18n.loader().is_cached(&locale("pt-BR"), *ns), "{ns} not loaded");
        assert_eq!(source.fetch_count("pt-BR", *ns), 1, "{ns} fetched more than once");
    }

    assert_eq!(i18n.resolver().resolve(), locale("pt-BR"));
    assert_eq!(store.get(), Some(locale("pt-BR")));
}

#[tokio::test]
async fn test_missing_namespace_does_not_block_navigation() {
    let (loader, _) = scripted_loader(ScriptedSource::new().failing(Namespace::Ranking));
    let i18n = I18n::new(
        LocaleSet::default(),
        loader,
        Arc::new(MemoryPreferenceStore::new()),
        Arc::new(FixedLanguage::new("pt-BR")),
    );
    i18n.initialize().await;

    let outcome = i18n.navigate("EventDetail").await;

    assert_eq!(outcome.missing, vec![Namespace::Ranking]);
    assert!(!outcome.is_complete());
    assert_eq!(i18n.current_route().as_deref(), Some("EventDetail"));
    assert_eq!(i18n.translate("ranking.title"), "ranking.title");
    assert_eq!(i18n.translate("events.title"), "Eventos");

    i18n.tasks().wait_idle().await;
}

#[tokio::test]
async fn test_single_locale_configuration() {
    let locales = LocaleSet::new(
        vec![tourney_i18n::locale::LocaleInfo::new("pt-BR", "Português (BR)")],
        "pt-BR",
        "pt-BR",
    )
    .unwrap();
    let (loader, source) = scripted_loader(ScriptedSource::new());
    let i18n = I18n::new(
        locales,
        loader,
        Arc::new(MemoryPreferenceStore::new()),
        Arc::new(FixedLanguage::new("en-US")),
    );

    let state = i18n.initialize().await;
    i18n.tasks().wait_idle().await;

    assert_eq!(state.locale, locale("pt-BR"));
    assert_eq!(i18n.available_locales().len(), 1);
    assert!(i18n.set_locale("en-US").await.is_err());
    assert_eq!(source.fetch_count("en-US", Namespace::Common), 0);
}

#[tokio::test]
async fn test_set_locale_succeeds_when_route_namespace_fails() {
    let store = Arc::new(MemoryPreferenceStore::new());
    let (loader, source) = scripted_loader(
        ScriptedSource::new()
            .failing(Namespace::Players)
            .failing(Namespace::Settings),
    );
    let i18n = I18n::new(
        LocaleSet::default(),
        loader,
        store.clone(),
        Arc::new(FixedLanguage::new("en-US")),
    );
    i18n.initialize().await;

    let outcome = i18n.navigate("Players").await;
    assert_eq!(outcome.missing, vec![Namespace::Players]);

    let result = i18n.set_locale("pt-BR").await;

    assert_eq!(result.unwrap(), locale("pt-BR"));
    assert_eq!(i18n.active_locale(), locale("pt-BR"));
    assert_eq!(store.get(), Some(locale("pt-BR")));
    assert_eq!(i18n.translate("common.app.title"), "Gerenciador de Torneios");
    assert_eq!(i18n.translate("players.title"), "players.title");

    // Background loading of the failing namespaces stays internal.
    i18n.tasks().wait_idle().await;
    assert!(!i18n.loader().is_cached(&locale("pt-BR"), Namespace::Players));
    assert!(!i18n.loader().is_cached(&locale("pt-BR"), Namespace::Settings));
    assert!(source.fetch_count("pt-BR", Namespace::Settings) >= 1);
    assert_eq!(i18n.active_locale(), locale("pt-BR"));
}
