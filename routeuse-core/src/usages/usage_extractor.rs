//! Call-site extraction from frontend source files.
//!
//! Four call shapes are scanned for independently: direct client
//! calls (`axios.get(...)`), generic `fetch(...)`, bare wrapper
//! functions (`get<Car>('/api/v1/cars')`), and instance-qualified
//! calls (`apiClient.post(...)`). The scans overlap on purpose; one
//! physical construct may be recorded more than once and nothing is
//! deduplicated here.
//!
//! All patterns run against whole file contents, not lines, so calls
//! broken across physical lines (a line break before the method dot
//! or the opening parenthesis) are still found. The reported line is
//! computed from the byte offset of the match start.

use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::method::HttpMethod;
use crate::scan::{self, relative_display};
use crate::usages::{usage_key, Usage, UsageMap};

/// How far around a `fetch(` call to look for a `method:` option.
const METHOD_WINDOW: usize = 200;

/// Extracts [`Usage`]s from frontend sources into a [`UsageMap`].
pub struct UsageExtractor {
    client_call: Regex,
    fetch_call: Regex,
    wrapper_calls: Vec<(Regex, HttpMethod)>,
    instance_call: Regex,
    method_hints: Vec<(Regex, HttpMethod)>,
}

impl Default for UsageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageExtractor {
    pub fn new() -> Self {
        let wrapper = |name: &str| {
            Regex::new(&format!(
                r#"\b{}\s*(?:<[^>]+>)?\s*\(\s*[`"'](?P<url>[^`"']+)[`"']"#,
                name
            ))
            .expect("hardcoded wrapper pattern is valid")
        };
        let hint = |name: &str| {
            Regex::new(&format!(r#"(?i)method\s*:\s*["']{}["']"#, name))
                .expect("hardcoded method hint pattern is valid")
        };

        Self {
            client_call: Regex::new(
                r#"axios\s*\.\s*(?P<method>get|post|put|delete|patch)\s*\(\s*[`"'](?P<url>[^`"']+)[`"']"#,
            )
            .expect("hardcoded client pattern is valid"),
            fetch_call: Regex::new(r#"fetch\s*\(\s*[`"'](?P<url>[^`"']+)[`"']"#)
                .expect("hardcoded fetch pattern is valid"),
            wrapper_calls: vec![
                (wrapper("get"), HttpMethod::Get),
                (wrapper("post"), HttpMethod::Post),
                (wrapper("put"), HttpMethod::Put),
                (wrapper("delete"), HttpMethod::Delete),
            ],
            instance_call: Regex::new(
                r#"\b\w+\s*\.\s*(?P<method>get|post|put|delete|patch)\s*(?:<[^>]+>)?\s*\(\s*[`"'](?P<url>[^`"']+)[`"']"#,
            )
            .expect("hardcoded instance pattern is valid"),
            method_hints: vec![
                (hint("POST"), HttpMethod::Post),
                (hint("PUT"), HttpMethod::Put),
                (hint("DELETE"), HttpMethod::Delete),
                (hint("PATCH"), HttpMethod::Patch),
            ],
        }
    }

    /// Scan all script files under `frontend_root/src_subpath`.
    ///
    /// File paths are recorded relative to the directory containing the
    /// frontend root, so reports from several frontends stay
    /// distinguishable. Unreadable files are logged and skipped.
    pub fn extract_dir(&self, frontend_root: &Path, src_subpath: &str, map: &mut UsageMap) {
        let src_path = frontend_root.join(src_subpath);
        if !src_path.exists() {
            warn!(path = %src_path.display(), "frontend source path not found, nothing scanned");
            return;
        }

        let base = frontend_root.parent().unwrap_or(frontend_root);
        let files = match scan::gather_frontend_files(&src_path) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %src_path.display(), error = %e, "frontend scan failed");
                return;
            }
        };

        for file in &files {
            match fs::read_to_string(file) {
                Ok(content) => {
                    let rel = relative_display(file, base);
                    self.extract_from_source(&rel, &content, map);
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unreadable frontend file");
                }
            }
        }
    }

    /// Scan one file's content, appending every match to `map`.
    pub fn extract_from_source(&self, rel_path: &str, content: &str, map: &mut UsageMap) {
        let lines: Vec<&str> = content.lines().collect();

        for caps in self.client_call.captures_iter(content) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if let Some(method) = HttpMethod::parse_token(&caps["method"]) {
                record(map, rel_path, &lines, content, start, method, &caps["url"]);
            }
        }

        for caps in self.fetch_call.captures_iter(content) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let method = self.sniff_method(content, whole.start, whole.end);
            record(map, rel_path, &lines, content, whole.start, method, &caps["url"]);
        }

        for (pattern, method) in &self.wrapper_calls {
            for caps in pattern.captures_iter(content) {
                let start = caps.get(0).map_or(0, |m| m.start());
                record(map, rel_path, &lines, content, start, *method, &caps["url"]);
            }
        }

        for caps in self.instance_call.captures_iter(content) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if let Some(method) = HttpMethod::parse_token(&caps["method"]) {
                record(map, rel_path, &lines, content, start, method, &caps["url"]);
            }
        }
    }

    /// Infer the method of a fetch-style call from a `method:` token in
    /// the surrounding window; GET when none is found.
    fn sniff_method(&self, content: &str, start: usize, end: usize) -> HttpMethod {
        let ctx_start = floor_char_boundary(content, start.saturating_sub(METHOD_WINDOW));
        let ctx_end = ceil_char_boundary(content, (end + METHOD_WINDOW).min(content.len()));
        let context = &content[ctx_start..ctx_end];

        for (pattern, method) in &self.method_hints {
            if pattern.is_match(context) {
                return *method;
            }
        }
        HttpMethod::Get
    }
}

fn record(
    map: &mut UsageMap,
    rel_path: &str,
    lines: &[&str],
    content: &str,
    match_start: usize,
    method: HttpMethod,
    url: &str,
) {
    let line = content[..match_start].bytes().filter(|&b| b == b'\n').count() + 1;
    let snippet = lines
        .get(line - 1)
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    map.entry(usage_key(method, url)).or_default().push(Usage {
        file: rel_path.to_string(),
        line,
        snippet,
    });
}

// Match offsets are byte positions; the sniffing window must not land
// inside a multi-byte character.
fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
