//! Route-to-namespace mapping and the navigation guard
//!
//! Before a view renders, the guard loads the namespaces its route needs so
//! the view does not flash untranslated keys. The guard is best effort: it
//! always lets navigation proceed, whatever the load outcome.

use std::sync::Arc;

use crate::loader::NamespaceLoader;
use crate::locale::{Locale, Namespace};

/// Namespaces a route needs before rendering; unknown routes need none
///
/// Both the router's view names (`EventDetail`) and path-style names
/// (`event-detail`) are accepted.
pub fn namespaces_for_route(route: &str) -> &'static [Namespace] {
    match route {
        "Home" | "home" => &[Namespace::Navigation],
        "Events" | "events" => &[Namespace::Events],
        "EventDetail" | "event-detail" => &[
            Namespace::Events,
            Namespace::Players,
            Namespace::Matches,
            Namespace::Ranking,
        ],
        "Players" | "players" => &[Namespace::Players],
        "Matches" | "matches" => &[Namespace::Matches],
        "Ranking" | "ranking" => &[Namespace::Ranking],
        "Status" | "status" => &[Namespace::Messages],
        "Settings" | "settings" => &[Namespace::Settings],
        _ => &[],
    }
}

/// Result of running the guard for one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub route: String,
    pub locale: Locale,
    /// Namespaces the route asked for
    pub namespaces: Vec<Namespace>,
    /// Requested namespaces that came back empty
    pub missing: Vec<Namespace>,
}

impl NavigationOutcome {
    /// Every requested namespace has messages
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Preloads translations before a navigation completes
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    loader: Arc<NamespaceLoader>,
}

impl NavigationGuard {
    pub fn new(loader: Arc<NamespaceLoader>) -> Self {
        Self { loader }
    }

    /// Load the route's namespaces for `locale`, then let navigation proceed
    ///
    /// No timeout is layered over the loader's own; a failed load shows up in
    /// `NavigationOutcome::missing` and never blocks the navigation.
    pub async fn before_navigate(&self, locale: &Locale, route: &str) -> NavigationOutcome {
        let namespaces = namespaces_for_route(route);

        let missing = if namespaces.is_empty() {
            tracing::trace!(route = route, "No namespaces to preload for route");
            Vec::new()
        } else {
            let loaded = self.loader.load_namespaces(locale, namespaces).await;
            loaded
                .into_iter()
                .filter(|(_, bundle)| bundle.is_empty())
                .map(|(ns, _)| ns)
                .collect::<Vec<_>>()
        };

        if !missing.is_empty() {
            tracing::warn!(
                route = route,
                locale = %locale,
                missing = ?missing,
                "Proceeding with navigation despite missing translations"
            );
        }

        NavigationOutcome {
            route: route.to_string(),
            locale: locale.clone(),
            namespaces: namespaces.to_vec(),
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::EmbeddedSource;

    #[test]
    fn test_route_table() {
        assert_eq!(namespaces_for_route("Events"), &[Namespace::Events]);
        assert_eq!(namespaces_for_route("event-detail").len(), 4);
        assert_eq!(namespaces_for_route("Status"), &[Namespace::Messages]);
        assert!(namespaces_for_route("Unknown").is_empty());
        assert!(namespaces_for_route("").is_empty());
    }

    #[tokio::test]
    async fn test_guard_loads_route_namespaces() {
        let loader = Arc::new(NamespaceLoader::new(EmbeddedSource::new()));
        let guard = NavigationGuard::new(Arc::clone(&loader));
        let pt = Locale::parse("pt-BR").unwrap();

        let outcome = guard.before_navigate(&pt, "Players").await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.namespaces, vec![Namespace::Players]);
        assert!(loader.is_cached(&pt, Namespace::Players));
    }

    #[tokio::test]
    async fn test_guard_proceeds_on_missing_bundles() {
        let loader = Arc::new(NamespaceLoader::new(EmbeddedSource::new()));
        let guard = NavigationGuard::new(loader);
        let fr = Locale::parse("fr-FR").unwrap();

        let outcome = guard.before_navigate(&fr, "Ranking").await;
        assert!(!outcome.is_complete());
        assert_eq!(outcome.missing, vec![Namespace::Ranking]);
    }

    #[tokio::test]
    async fn test_guard_unknown_route() {
        let loader = Arc::new(NamespaceLoader::new(EmbeddedSource::new()));
        let guard = NavigationGuard::new(Arc::clone(&loader));
        let en = Locale::parse("en-US").unwrap();

        let outcome = guard.before_navigate(&en, "Login").await;
        assert!(outcome.is_complete());
        assert!(outcome.namespaces.is_empty());
        assert_eq!(loader.stats().fetches, 0);
    }
}
