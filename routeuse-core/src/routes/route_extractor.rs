//! Route extraction from backend source files.
//!
//! Scans line by line for route decorators. A handler may carry
//! several stacked route decorators (registering it under more than
//! one group or path), and a decorator's argument list may wrap across
//! physical lines; both cases collapse to endpoints that report the
//! first decorator's line number, so every annotation for one handler
//! has a single reportable location.

use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::method::HttpMethod;
use crate::routes::{Endpoint, RouteGroups};
use crate::scan::{self, relative_display};

/// Extracts [`Endpoint`]s from backend sources.
pub struct RouteExtractor {
    groups: RouteGroups,
    markers: Vec<String>,
    route_re: Regex,
    handler_re: Regex,
}

impl RouteExtractor {
    pub fn new(groups: RouteGroups) -> Self {
        let markers = groups.markers();
        Self {
            groups,
            markers,
            route_re: Regex::new(
                r#"@(?P<group>\w+)\.route\(\s*["'](?P<path>[^"']+)["'](?:\s*,\s*methods\s*=\s*\[(?P<methods>[^\]]+)\])?"#,
            )
            .expect("hardcoded route pattern is valid"),
            handler_re: Regex::new(r"def\s+(\w+)\s*\(").expect("hardcoded handler pattern is valid"),
        }
    }

    /// Extract every endpoint found under `backend_root/api_subpath`.
    ///
    /// A missing API subdirectory and unreadable files are logged and
    /// skipped; no error propagates out of extraction.
    pub fn extract_dir(&self, backend_root: &Path, api_subpath: &str) -> Vec<Endpoint> {
        let api_path = backend_root.join(api_subpath);
        if !api_path.exists() {
            warn!(path = %api_path.display(), "API path not found, no routes extracted");
            return Vec::new();
        }

        let files = match scan::gather_backend_files(&api_path) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %api_path.display(), error = %e, "backend scan failed");
                return Vec::new();
            }
        };

        let mut endpoints = Vec::new();
        for file in &files {
            match fs::read_to_string(file) {
                Ok(content) => {
                    let rel = relative_display(file, backend_root);
                    endpoints.extend(self.extract_from_source(&rel, &content));
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unreadable backend file");
                }
            }
        }
        endpoints
    }

    /// Scan one file's content for route decorators.
    pub fn extract_from_source(&self, rel_path: &str, content: &str) -> Vec<Endpoint> {
        let lines: Vec<&str> = content.lines().collect();
        let mut endpoints = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if !self.is_route_decorator(lines[i]) {
                i += 1;
                continue;
            }

            // Every endpoint in this stack reports the first decorator's line.
            let first_decorator_line = i + 1;
            let mut decorators: Vec<String> = Vec::new();

            let mut j = i;
            while j < lines.len() {
                let current = lines[j];
                if self.is_route_decorator(current) {
                    let (text, next) = collect_decorator(&lines, j);
                    decorators.push(text);
                    j = next;
                } else if current.trim().is_empty() || current.trim_start().starts_with('@') {
                    // Blank lines and non-route decorators inside the stack
                    j += 1;
                } else {
                    // First real code line: the handler definition
                    break;
                }
            }

            let handler = lines
                .get(j)
                .and_then(|line| self.handler_re.captures(line))
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| "unknown".to_string());

            for decorator in &decorators {
                if let Some(caps) = self.route_re.captures(decorator) {
                    let prefix = self.groups.resolve(&caps["group"]).to_string();
                    let path = caps["path"].to_string();
                    let methods = match caps.name("methods") {
                        Some(list) => parse_method_list(list.as_str()),
                        None => vec![HttpMethod::Get],
                    };

                    for method in methods {
                        endpoints.push(Endpoint {
                            method,
                            path: path.clone(),
                            file: rel_path.to_string(),
                            line: first_decorator_line,
                            handler: handler.clone(),
                            prefix: prefix.clone(),
                        });
                    }
                }
            }

            i = j + 1;
        }

        endpoints
    }

    fn is_route_decorator(&self, line: &str) -> bool {
        self.markers.iter().any(|marker| line.contains(marker))
    }
}

/// Collect the full text of the decorator starting at `start`,
/// concatenating continuation lines while the opening parenthesis is
/// unbalanced. Returns the joined text and the index after it.
fn collect_decorator(lines: &[&str], start: usize) -> (String, usize) {
    let first = lines[start];
    let mut parts = vec![first.trim().to_string()];
    let mut k = start + 1;

    if !first.contains(')') || first.trim_end().ends_with('(') {
        while k < lines.len() {
            parts.push(lines[k].trim().to_string());
            if lines[k].contains(')') {
                k += 1;
                break;
            }
            k += 1;
        }
    }

    let next = if k > start + 1 { k } else { start + 1 };
    (parts.join(" "), next)
}

/// Parse a comma-separated, quoted method list like `"GET", "POST"`.
fn parse_method_list(list: &str) -> Vec<HttpMethod> {
    list.split(',')
        .filter_map(|token| {
            HttpMethod::parse_token(token.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RouteExtractor {
        RouteExtractor::new(RouteGroups::default())
    }

    #[test]
    fn test_simple_route_defaults_to_get() {
        let source = r#"
@api.route("/cars")
def list_cars():
    pass
"#;
        let endpoints = extractor().extract_from_source("app/api/v1/cars.py", source);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, HttpMethod::Get);
        assert_eq!(endpoints[0].full_path(), "/api/v1/cars");
        assert_eq!(endpoints[0].handler, "list_cars");
        assert_eq!(endpoints[0].line, 2);
    }

    #[test]
    fn test_explicit_method_list() {
        let source = r#"@api.route("/cars", methods=["POST", "PUT"])
def save_car():
    pass
"#;
        let endpoints = extractor().extract_from_source("cars.py", source);
        let methods: Vec<HttpMethod> = endpoints.iter().map(|e| e.method).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Put]);
        assert!(endpoints.iter().all(|e| e.line == 1));
    }

    #[test]
    fn test_stacked_decorators_share_first_line() {
        let source = r#"
@api.route("/a")
@aade_bp.route("/b")
def handle():
    pass
"#;
        let endpoints = extractor().extract_from_source("x.py", source);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].full_path(), "/api/v1/a");
        assert_eq!(endpoints[1].full_path(), "/api/v1/aade/b");
        // Both collapse to the first decorator's line
        assert_eq!(endpoints[0].line, 2);
        assert_eq!(endpoints[1].line, 2);
        assert!(endpoints.iter().all(|e| e.handler == "handle"));
    }

    #[test]
    fn test_multiline_decorator_arguments() {
        let source = r#"@api.route("/orders",
           methods=["POST"])
@authenticated
def create_order():
    pass
"#;
        let endpoints = extractor().extract_from_source("orders.py", source);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, HttpMethod::Post);
        assert_eq!(endpoints[0].line, 1);
        assert_eq!(endpoints[0].handler, "create_order");
    }

    #[test]
    fn test_interleaved_non_route_decorators() {
        let source = r#"@api.route("/secure")
@requires_auth
@api.route("/secure-alias")
def secure():
    pass
"#;
        let endpoints = extractor().extract_from_source("secure.py", source);
        assert_eq!(endpoints.len(), 2);
        assert!(endpoints.iter().all(|e| e.line == 1));
        assert!(endpoints.iter().all(|e| e.handler == "secure"));
    }

    #[test]
    fn test_unknown_method_tokens_are_skipped() {
        let source = r#"@api.route("/opts", methods=["OPTIONS", "GET"])
def opts():
    pass
"#;
        let endpoints = extractor().extract_from_source("opts.py", source);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_dynamic_segments_kept_verbatim() {
        let source = r#"@api.route("/cars/<uuid:car_id>/status")
def car_status(car_id):
    pass
"#;
        let endpoints = extractor().extract_from_source("cars.py", source);
        assert_eq!(endpoints[0].path, "/cars/<uuid:car_id>/status");
    }

    #[test]
    fn test_unrelated_decorators_yield_nothing() {
        let source = r#"@admin_bp.route("/hidden")
def hidden():
    pass

@cache.memoize()
def helper():
    pass
"#;
        // admin_bp is not a configured group marker, so the line never
        // begins a candidate block.
        let endpoints = extractor().extract_from_source("misc.py", source);
        assert!(endpoints.is_empty());
    }

    #[test]
    fn test_missing_handler_reports_unknown() {
        let source = "@api.route(\"/tail\")";
        let endpoints = extractor().extract_from_source("tail.py", source);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].handler, "unknown");
    }
}
