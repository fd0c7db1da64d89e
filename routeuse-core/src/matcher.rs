//! Pairing declared routes with observed call-sites.
//!
//! Exact key equality is tried first, then a fuzzy pass that strips
//! template-variable host prefixes from the observed URL and compares
//! path segments, letting a dynamic `<...>` segment stand in for any
//! concrete value. The fuzzy pass trades precision for recall; a
//! literal segment in frontend code will satisfy any dynamic segment
//! in the same position.

use regex::Regex;

use crate::routes::Endpoint;
use crate::usages::{Usage, UsageMap};

/// One endpoint together with every call-site attributed to it.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Endpoint,
    pub usages: Vec<Usage>,
}

impl RouteMatch {
    pub fn is_used(&self) -> bool {
        !self.usages.is_empty()
    }
}

/// Compares observed URLs against route path templates.
pub struct PathMatcher {
    host_prefixes: Vec<Regex>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMatcher {
    pub fn new() -> Self {
        let strip = |pattern: &str| Regex::new(pattern).expect("hardcoded strip pattern is valid");
        Self {
            // Template variables naming the backend host, with the slash
            // that follows them, are not part of the route path.
            host_prefixes: vec![
                strip(r"\$\{BACKEND[^}]*\}/?"),
                strip(r"\$\{[^}]*DOMAIN[^}]*\}/?"),
                strip(r"\$\{[^}]*URL[^}]*\}/?"),
            ],
        }
    }

    /// Attribute call-sites to every endpoint.
    ///
    /// Endpoint order is preserved and each endpoint appears exactly
    /// once, used or not. A call-site already attributed through the
    /// exact key is not attributed again by the fuzzy pass.
    pub fn match_routes(&self, endpoints: &[Endpoint], usages: &UsageMap) -> Vec<RouteMatch> {
        endpoints
            .iter()
            .map(|endpoint| {
                let mut attributed: Vec<Usage> = Vec::new();

                if let Some(exact) = usages.get(&endpoint.usage_key()) {
                    attributed.extend(exact.iter().cloned());
                }

                for (usage_key, sites) in usages {
                    if self.routes_match(endpoint, usage_key) {
                        for site in sites {
                            if !attributed.contains(site) {
                                attributed.push(site.clone());
                            }
                        }
                    }
                }

                RouteMatch {
                    endpoint: endpoint.clone(),
                    usages: attributed,
                }
            })
            .collect()
    }

    /// Whether a usage-map key refers to this endpoint.
    pub fn routes_match(&self, endpoint: &Endpoint, usage_key: &str) -> bool {
        let Some((usage_method, usage_path)) = usage_key.split_once(' ') else {
            return false;
        };

        if endpoint.method.as_str() != usage_method {
            return false;
        }

        let full_path = endpoint.full_path();
        if full_path == usage_path {
            return true;
        }

        let cleaned = self.strip_host_prefixes(usage_path);
        if full_path == cleaned {
            return true;
        }

        segments_match(&full_path, &cleaned)
    }

    fn strip_host_prefixes(&self, usage_path: &str) -> String {
        let mut cleaned = usage_path.to_string();
        for pattern in &self.host_prefixes {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        cleaned
    }
}

/// Segment-by-segment comparison of a route template against a
/// cleaned usage path. Counts must agree; a `<...>` route segment
/// accepts any non-empty usage segment.
fn segments_match(route_path: &str, usage_path: &str) -> bool {
    let route_segments: Vec<&str> = route_path.split('/').filter(|s| !s.is_empty()).collect();
    let usage_segments: Vec<&str> = usage_path.split('/').filter(|s| !s.is_empty()).collect();

    if route_segments.len() != usage_segments.len() {
        return false;
    }

    route_segments
        .iter()
        .zip(&usage_segments)
        .all(|(route_seg, usage_seg)| {
            if route_seg.starts_with('<') && route_seg.ends_with('>') {
                // Template interpolations and any literal value satisfy
                // a dynamic segment.
                usage_seg.contains("${") || usage_seg.contains('{') || !usage_seg.is_empty()
            } else {
                route_seg == usage_seg
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;
    use crate::usages::usage_key;

    fn endpoint(method: HttpMethod, prefix: &str, path: &str) -> Endpoint {
        Endpoint {
            method,
            path: path.to_string(),
            file: "app/api/v1/cars.py".to_string(),
            line: 1,
            handler: "handler".to_string(),
            prefix: prefix.to_string(),
        }
    }

    fn usage(file: &str, line: usize) -> Usage {
        Usage {
            file: file.to_string(),
            line,
            snippet: String::new(),
        }
    }

    #[test]
    fn test_exact_key_match() {
        let matcher = PathMatcher::new();
        let endpoints = vec![endpoint(HttpMethod::Get, "/api/v1", "/cars")];
        let mut usages = UsageMap::new();
        usages.insert(
            usage_key(HttpMethod::Get, "/api/v1/cars"),
            vec![usage("web/src/a.ts", 3)],
        );

        let matched = matcher.match_routes(&endpoints, &usages);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].usages.len(), 1);
        assert!(matched[0].is_used());
    }

    #[test]
    fn test_exact_and_fuzzy_do_not_double_count() {
        let matcher = PathMatcher::new();
        let endpoints = vec![endpoint(HttpMethod::Get, "/api/v1", "/cars")];
        let mut usages = UsageMap::new();
        usages.insert(
            usage_key(HttpMethod::Get, "/api/v1/cars"),
            vec![usage("web/src/a.ts", 3)],
        );

        // The exact key also satisfies the fuzzy pass; the call-site
        // must still appear once.
        let matched = matcher.match_routes(&endpoints, &usages);
        assert_eq!(matched[0].usages.len(), 1);
    }

    #[test]
    fn test_host_template_prefix_is_stripped() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Post, "/api/v1", "/orders");
        assert!(matcher.routes_match(&ep, "POST ${BACKEND_URL}/api/v1/orders"));
        assert!(matcher.routes_match(&ep, "POST ${API_DOMAIN}/api/v1/orders"));
        assert!(matcher.routes_match(&ep, "POST ${SERVER_URL}/api/v1/orders"));
    }

    #[test]
    fn test_dynamic_segment_accepts_interpolation_and_literal() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Get, "/api/v1", "/cars/<uuid:car_id>");
        assert!(matcher.routes_match(&ep, "GET /api/v1/cars/${carId}"));
        // Known precision trade-off: a literal also satisfies the
        // dynamic segment.
        assert!(matcher.routes_match(&ep, "GET /api/v1/cars/123"));
        assert!(matcher.routes_match(&ep, "GET /api/v1/cars/search"));
    }

    #[test]
    fn test_segment_count_must_agree() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Get, "/api/v1", "/cars/<id>");
        assert!(!matcher.routes_match(&ep, "GET /api/v1/cars"));
        assert!(!matcher.routes_match(&ep, "GET /api/v1/cars/1/status"));
    }

    #[test]
    fn test_method_must_agree() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Get, "/api/v1", "/cars");
        assert!(!matcher.routes_match(&ep, "POST /api/v1/cars"));
    }

    #[test]
    fn test_static_segments_must_match_exactly() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Get, "/api/v1", "/cars");
        assert!(!matcher.routes_match(&ep, "GET /api/v1/trucks"));
    }

    #[test]
    fn test_malformed_key_never_matches() {
        let matcher = PathMatcher::new();
        let ep = endpoint(HttpMethod::Get, "/api/v1", "/cars");
        assert!(!matcher.routes_match(&ep, "GET/api/v1/cars"));
    }

    #[test]
    fn test_unused_endpoint_still_reported() {
        let matcher = PathMatcher::new();
        let endpoints = vec![
            endpoint(HttpMethod::Get, "/api/v1", "/cars"),
            endpoint(HttpMethod::Delete, "/api/v1", "/cars/<id>"),
        ];
        let usages = UsageMap::new();

        let matched = matcher.match_routes(&endpoints, &usages);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|m| !m.is_used()));
    }
}
