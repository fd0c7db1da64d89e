//! Route-group prefix resolution.
//!
//! A route group is the identifier in front of `.route(` in a backend
//! decorator; each known group maps to a static URL prefix. The table
//! is an explicit value handed to the extractor, so there is no
//! process-wide registry to initialize in the right order.

use std::collections::BTreeMap;

/// Table of route-group identifiers and their URL prefixes.
#[derive(Debug, Clone)]
pub struct RouteGroups {
    prefixes: BTreeMap<String, String>,
    fallback: String,
}

impl Default for RouteGroups {
    fn default() -> Self {
        let mut prefixes = BTreeMap::new();
        prefixes.insert("api".to_string(), "/api/v1".to_string());
        prefixes.insert("aade_bp".to_string(), "/api/v1/aade".to_string());
        Self {
            prefixes,
            fallback: "/api/v1".to_string(),
        }
    }
}

impl RouteGroups {
    /// Build a table from overrides merged on top of the defaults.
    ///
    /// `fallback` replaces the baseline prefix applied to unknown group
    /// identifiers when given.
    pub fn with_overrides(
        overrides: impl IntoIterator<Item = (String, String)>,
        fallback: Option<String>,
    ) -> Self {
        let mut groups = Self::default();
        groups.prefixes.extend(overrides);
        if let Some(fallback) = fallback {
            groups.fallback = fallback;
        }
        groups
    }

    /// Resolve a group identifier to its prefix.
    ///
    /// Unknown identifiers get the baseline prefix rather than failing.
    pub fn resolve(&self, ident: &str) -> &str {
        self.prefixes
            .get(ident)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Decorator markers that begin a candidate block, e.g. `@api.route(`.
    pub fn markers(&self) -> Vec<String> {
        self.prefixes
            .keys()
            .map(|ident| format!("@{}.route(", ident))
            .collect()
    }
}
