//! Markdown report generation and parse-back.
//!
//! Two reports are written per audit: routes with at least one
//! attributed call-site and routes with none. The annotation pass
//! later reads these reports back instead of re-running the audit, so
//! the writer and [`parse_report`] must agree on the section format.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::info;

use crate::error::{IoResultExt, RouteuseError, RouteuseResult};
use crate::matcher::RouteMatch;
use crate::method::HttpMethod;

/// Default file name for the used-routes report.
pub const WITH_USAGE_REPORT: &str = "routes_with_usage.md";
/// Default file name for the unused-routes report.
pub const WITHOUT_USAGE_REPORT: &str = "routes_without_usage.md";

const FOOTER: &str = "*Report generated by routeuse*\n";

/// Snippets longer than this are truncated in the report.
const SNIPPET_LIMIT: usize = 100;

/// Counts reported after writing both files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub used_routes: usize,
    pub total_calls: usize,
    pub unused_routes: usize,
}

/// Write both reports and return the headline counts.
pub fn write_reports(
    matches: &[RouteMatch],
    with_path: &Path,
    without_path: &Path,
) -> RouteuseResult<ReportSummary> {
    let mut used: Vec<&RouteMatch> = matches.iter().filter(|m| m.is_used()).collect();
    let mut unused: Vec<&RouteMatch> = matches.iter().filter(|m| !m.is_used()).collect();
    used.sort_by_key(|m| (m.endpoint.method, m.endpoint.full_path()));
    unused.sort_by_key(|m| (m.endpoint.method, m.endpoint.full_path()));

    let summary = ReportSummary {
        used_routes: used.len(),
        total_calls: used.iter().map(|m| m.usages.len()).sum(),
        unused_routes: unused.len(),
    };

    fs::write(with_path, render_used_report(&used, summary.total_calls)).with_path(with_path)?;
    fs::write(without_path, render_unused_report(&unused)).with_path(without_path)?;

    info!(
        used_routes = summary.used_routes,
        total_calls = summary.total_calls,
        unused_routes = summary.unused_routes,
        "reports written"
    );
    Ok(summary)
}

fn by_method<'a>(matches: &[&'a RouteMatch]) -> BTreeMap<HttpMethod, Vec<&'a RouteMatch>> {
    let mut grouped: BTreeMap<HttpMethod, Vec<&RouteMatch>> = BTreeMap::new();
    for &m in matches {
        grouped.entry(m.endpoint.method).or_default().push(m);
    }
    grouped
}

fn write_toc(out: &mut String, grouped: &BTreeMap<HttpMethod, Vec<&RouteMatch>>) {
    out.push_str("## Table of Contents\n\n");
    for (method, routes) in grouped {
        out.push_str(&format!(
            "- [{} Routes ({})](#-{}-routes-)\n",
            method,
            routes.len(),
            method.as_str().to_lowercase()
        ));
    }
    out.push_str("\n---\n\n");
}

fn write_route_header(out: &mut String, m: &RouteMatch) {
    out.push_str(&format!(
        "### {} `{}`\n\n",
        m.endpoint.method,
        m.endpoint.full_path()
    ));
    out.push_str(&format!(
        "**Backend Location:** `{}:{}`\n\n",
        m.endpoint.file, m.endpoint.line
    ));
    out.push_str(&format!("**Function:** `{}()`\n\n", m.endpoint.handler));
}

fn render_used_report(used: &[&RouteMatch], total_calls: usize) -> String {
    let mut out = String::new();
    out.push_str("# Routes WITH Frontend Usage\n\n");
    out.push_str(&format!("**Total Routes with Usage:** {}\n\n", used.len()));
    out.push_str(&format!("**Total Frontend Calls:** {}\n\n", total_calls));
    out.push_str("---\n\n");

    let grouped = by_method(used);
    write_toc(&mut out, &grouped);

    for (method, routes) in &grouped {
        out.push_str(&format!("## {} Routes\n\n", method));
        for m in routes {
            write_route_header(&mut out, m);
            let plural = if m.usages.len() == 1 { "" } else { "s" };
            out.push_str(&format!(
                "**Frontend Usage:** ({} location{})\n\n",
                m.usages.len(),
                plural
            ));

            for usage in &m.usages {
                out.push_str(&format!("- `{}:{}`\n", usage.file, usage.line));
                out.push_str(&format!(
                    "  ```typescript\n  {}\n  ```\n",
                    truncate_snippet(&usage.snippet)
                ));
            }
            out.push_str("\n---\n\n");
        }
    }

    out.push_str(FOOTER);
    out
}

fn render_unused_report(unused: &[&RouteMatch]) -> String {
    let mut out = String::new();
    out.push_str("# Routes WITHOUT Frontend Usage\n\n");
    out.push_str(&format!("**Total Unused Routes:** {}\n\n", unused.len()));
    out.push_str("Routes that have no detected frontend usage. These may be:\n");
    out.push_str("- Dead code that can be removed\n");
    out.push_str("- Internal/admin endpoints not used in these frontends\n");
    out.push_str("- Routes used by external clients (mobile apps, integrations)\n");
    out.push_str("- Future/upcoming features not yet implemented\n\n");
    out.push_str("---\n\n");

    let grouped = by_method(unused);
    write_toc(&mut out, &grouped);

    for (method, routes) in &grouped {
        out.push_str(&format!("## {} Routes\n\n", method));
        for m in routes {
            write_route_header(&mut out, m);
            out.push_str("---\n\n");
        }
    }

    out.push_str(FOOTER);
    out
}

fn truncate_snippet(snippet: &str) -> String {
    if snippet.chars().count() > SNIPPET_LIMIT {
        let truncated: String = snippet.chars().take(SNIPPET_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        snippet.to_string()
    }
}

/// One route as recovered from a report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedRoute {
    pub method: HttpMethod,
    pub path: String,
    /// Backend source file, relative to the backend root.
    pub backend_file: String,
    pub line: usize,
    pub handler: String,
    /// `file:line` references into frontend code.
    pub usage_locations: Vec<String>,
    pub has_usage: bool,
}

/// Parse a report file back into routes.
///
/// `expect_usage` says which of the two reports this is; a section in
/// the used-routes report that lists no locations is demoted to
/// unused. Sections missing a required field are skipped, not errors.
pub fn parse_report(path: &Path, expect_usage: bool) -> RouteuseResult<Vec<ReportedRoute>> {
    if !path.exists() {
        return Err(RouteuseError::report(path, "report file does not exist"));
    }
    let content = fs::read_to_string(path).with_path(path)?;
    Ok(parse_report_content(&content, expect_usage))
}

fn parse_report_content(content: &str, expect_usage: bool) -> Vec<ReportedRoute> {
    let section_re = Regex::new(r"\n### (DELETE|GET|PATCH|POST|PUT) ")
        .expect("hardcoded section pattern is valid");
    let path_re = Regex::new(r"^`([^`]+)`").expect("hardcoded path pattern is valid");
    let backend_re = Regex::new(r"\*\*Backend Location:\*\* `([^:]+):(\d+)`")
        .expect("hardcoded location pattern is valid");
    let func_re =
        Regex::new(r"\*\*Function:\*\* `([^`]+)`").expect("hardcoded function pattern is valid");
    let usage_re = Regex::new(r"^- `([^`]+)`$").expect("hardcoded usage pattern is valid");

    let headers: Vec<_> = section_re.captures_iter(content).collect();
    let mut routes = Vec::new();

    for (idx, caps) in headers.iter().enumerate() {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let section_end = headers
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |m| m.start());
        let section = &content[whole.end..section_end];

        let Some(method) = HttpMethod::parse_token(&caps[1]) else {
            continue;
        };
        let Some(path) = path_re.captures(section).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(backend) = backend_re.captures(section) else {
            continue;
        };
        let Ok(line) = backend[2].parse::<usize>() else {
            continue;
        };
        let Some(handler) = func_re
            .captures(section)
            .map(|c| c[1].trim_end_matches("()").to_string())
        else {
            continue;
        };

        let usage_locations: Vec<String> = if expect_usage {
            section
                .lines()
                .filter_map(|l| usage_re.captures(l.trim()))
                .map(|c| c[1].to_string())
                .collect()
        } else {
            Vec::new()
        };

        let has_usage = expect_usage && !usage_locations.is_empty();
        routes.push(ReportedRoute {
            method,
            path,
            backend_file: backend[1].to_string(),
            line,
            handler,
            usage_locations,
            has_usage,
        });
    }

    routes
}
