//! Compile-time registry of bundled translations
//!
//! Every loadable (locale, namespace) pair is listed here explicitly, so the
//! set of embedded resources can be enumerated and checked in tests.

use crate::locale::Namespace;

/// One embedded bundle: locale code, namespace and raw JSON text
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub locale: &'static str,
    pub namespace: Namespace,
    pub json: &'static str,
}

macro_rules! bundle {
    ($locale:literal, $ns:ident, $file:literal) => {
        RegistryEntry {
            locale: $locale,
            namespace: Namespace::$ns,
            json: include_str!(concat!("../../locales/", $locale, "/", $file, ".json")),
        }
    };
}

/// All embedded bundles
pub static ENTRIES: &[RegistryEntry] = &[
    bundle!("pt-BR", Common, "common"),
    bundle!("pt-BR", Navigation, "navigation"),
    bundle!("pt-BR", Events, "events"),
    bundle!("pt-BR", Players, "players"),
    bundle!("pt-BR", Matches, "matches"),
    bundle!("pt-BR", Ranking, "ranking"),
    bundle!("pt-BR", Validation, "validation"),
    bundle!("pt-BR", Messages, "messages"),
    bundle!("pt-BR", Settings, "settings"),
    bundle!("en-US", Common, "common"),
    bundle!("en-US", Navigation, "navigation"),
    bundle!("en-US", Events, "events"),
    bundle!("en-US", Players, "players"),
    bundle!("en-US", Matches, "matches"),
    bundle!("en-US", Ranking, "ranking"),
    bundle!("en-US", Validation, "validation"),
    bundle!("en-US", Messages, "messages"),
    bundle!("en-US", Settings, "settings"),
];

/// Find the embedded JSON for a pair
pub fn lookup(locale: &str, namespace: Namespace) -> Option<&'static str> {
    ENTRIES
        .iter()
        .find(|e| e.locale == locale && e.namespace == namespace)
        .map(|e| e.json)
}
