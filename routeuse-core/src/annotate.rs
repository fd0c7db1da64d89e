//! Usage-comment annotation of backend sources.
//!
//! Writes a marker-delimited comment block above each route's
//! decorator stack listing the frontend call-sites attributed to it,
//! or a "no usages" warning for unused routes. Blocks are bounded by
//! START/END markers so a later run can replace or remove them
//! without touching surrounding code.
//!
//! Annotation works from the report files, not from a live audit, so
//! a reviewed report can be applied as-is.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{IoResultExt, RouteuseError, RouteuseResult};
use crate::report::{parse_report, ReportedRoute};
use crate::scan;

pub const BLOCK_START: &str = "# START: USAGES TOOL";
pub const BLOCK_END: &str = "# END: USAGES TOOL";
// Older runs wrote these markers; cleaning recognizes both.
pub const LEGACY_BLOCK_START: &str = "# START: ROUTE USAGES TOOL";
pub const LEGACY_BLOCK_END: &str = "# END: ROUTE USAGES TOOL";

/// How many lines above the insertion point to search for an existing
/// block, and below a START marker for its END marker.
const BLOCK_SEARCH_WINDOW: usize = 10;

/// Counts from an annotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateSummary {
    pub files_processed: usize,
    pub files_missing: usize,
    pub comments_added: usize,
    pub comments_replaced: usize,
}

/// Counts from a cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub blocks_removed: usize,
}

/// Annotate backend files from the two report files.
///
/// With `dry_run` the pass computes everything but writes nothing.
pub fn annotate_backend(
    backend_root: &Path,
    with_report: &Path,
    without_report: &Path,
    dry_run: bool,
) -> RouteuseResult<AnnotateSummary> {
    let mut routes = parse_report(with_report, true)?;
    routes.extend(parse_report(without_report, false)?);

    let mut by_file: BTreeMap<String, Vec<ReportedRoute>> = BTreeMap::new();
    for route in routes {
        by_file.entry(route.backend_file.clone()).or_default().push(route);
    }

    let mut summary = AnnotateSummary::default();
    for (rel_path, file_routes) in &by_file {
        let file_path = backend_root.join(rel_path);
        if !file_path.exists() {
            warn!(file = %file_path.display(), "annotated file not found, skipping");
            summary.files_missing += 1;
            continue;
        }

        let content = fs::read_to_string(&file_path).with_path(&file_path)?;
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        let trailing_newline = content.ends_with('\n');

        let (added, replaced) = annotate_lines(&mut lines, file_routes);
        if added + replaced == 0 {
            continue;
        }

        summary.files_processed += 1;
        summary.comments_added += added;
        summary.comments_replaced += replaced;

        if dry_run {
            info!(file = %file_path.display(), added, replaced, "dry run, not writing");
        } else {
            let mut output = lines.join("\n");
            if trailing_newline {
                output.push('\n');
            }
            fs::write(&file_path, output).with_path(&file_path)?;
            debug!(file = %file_path.display(), added, replaced, "annotations written");
        }
    }

    Ok(summary)
}

/// Apply every route annotation for one file to its lines.
///
/// Routes sharing a decorator line are merged into one block; line
/// numbers are processed bottom-up so earlier insertions do not shift
/// later ones. Returns (blocks added, blocks replaced).
fn annotate_lines(lines: &mut Vec<String>, routes: &[ReportedRoute]) -> (usize, usize) {
    let mut by_line: BTreeMap<usize, Vec<&ReportedRoute>> = BTreeMap::new();
    for route in routes {
        by_line.entry(route.line).or_default().push(route);
    }

    let mut added = 0;
    let mut replaced = 0;
    for (&line_number, line_routes) in by_line.iter().rev() {
        if line_number == 0 || line_number > lines.len() {
            warn!(line = line_number, "reported line out of range, skipping");
            continue;
        }
        let decorator_line = line_number - 1;
        let mut insert_line = decorator_start(lines, decorator_line);

        // Merge call-sites from every route registered at this line,
        // first occurrence wins.
        let mut locations: Vec<&str> = Vec::new();
        for route in line_routes {
            for loc in &route.usage_locations {
                if !locations.contains(&loc.as_str()) {
                    locations.push(loc);
                }
            }
        }

        if let Some((start, end)) = existing_block(lines, insert_line) {
            lines.drain(start..=end);
            // The END marker may sit at or below the insertion point
            // when a stray code line ended up between the markers, so
            // clamp instead of assuming the whole block was above.
            insert_line = insert_line.saturating_sub(end - start + 1).max(start);
            replaced += 1;
        } else {
            added += 1;
        }

        let block = comment_block(&locations);
        lines.splice(insert_line..insert_line, block);
    }

    (added, replaced)
}

/// Walk upward from the reported decorator to the top of the stack,
/// so the block lands above every decorator rather than between them.
fn decorator_start(lines: &[String], decorator_line: usize) -> usize {
    let mut insert_line = decorator_line;
    let stop = decorator_line.saturating_sub(BLOCK_SEARCH_WINDOW);
    let mut hit_code = false;

    for i in (stop + 1..decorator_line).rev() {
        let trimmed = lines[i].trim();
        if !trimmed.is_empty() && !trimmed.starts_with('@') && !trimmed.starts_with('#') {
            insert_line = i + 1;
            hit_code = true;
            break;
        }
        if trimmed.starts_with('@') {
            insert_line = i;
        }
    }

    if !hit_code
        && decorator_line > 0
        && lines.first().map(|l| l.trim().starts_with('@')).unwrap_or(false)
    {
        insert_line = 0;
    }

    insert_line
}

/// Find a block already sitting just above the insertion point.
fn existing_block(lines: &[String], insert_line: usize) -> Option<(usize, usize)> {
    let search_from = insert_line.saturating_sub(BLOCK_SEARCH_WINDOW);
    for i in search_from..insert_line {
        if lines[i].contains(BLOCK_START) {
            let limit = (insert_line + 5).min(lines.len());
            for j in i + 1..limit {
                if lines[j].contains(BLOCK_END) {
                    return Some((i, j));
                }
            }
        }
    }
    None
}

fn comment_block(locations: &[&str]) -> Vec<String> {
    let mut block = vec![BLOCK_START.to_string()];
    if locations.is_empty() {
        block.push("# No Usages: Please Check Before Deleting".to_string());
    } else {
        // `./` prefix gives workspace-relative links editors can follow.
        for location in locations {
            block.push(format!("# ./{}", location));
        }
    }
    block.push(BLOCK_END.to_string());
    block
}

/// Remove every annotation block from backend files.
pub fn clean_backend(backend_root: &Path, dry_run: bool) -> RouteuseResult<CleanSummary> {
    let files = scan::gather_python_files(backend_root).map_err(|e| RouteuseError::Io {
        path: backend_root.to_path_buf(),
        message: e.to_string(),
        source: None,
    })?;

    let mut summary = CleanSummary::default();
    for file in &files {
        summary.files_scanned += 1;
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        let removed = remove_all_blocks(&mut lines);
        if removed == 0 {
            continue;
        }

        summary.files_modified += 1;
        summary.blocks_removed += removed;

        if dry_run {
            info!(file = %file.display(), removed, "dry run, not writing");
        } else {
            let mut output = lines.join("\n");
            if content.ends_with('\n') {
                output.push('\n');
            }
            fs::write(file, output).with_path(file)?;
        }
    }

    Ok(summary)
}

/// Strip every marker-delimited block, current and legacy markers
/// alike. Returns how many blocks were removed.
pub fn remove_all_blocks(lines: &mut Vec<String>) -> usize {
    let mut removed = 0;
    let mut i = 0;

    while i < lines.len() {
        let is_start = lines[i].contains(BLOCK_START) || lines[i].contains(LEGACY_BLOCK_START);
        if !is_start {
            i += 1;
            continue;
        }

        let limit = (i + BLOCK_SEARCH_WINDOW).min(lines.len());
        let end = (i + 1..limit)
            .find(|&j| lines[j].contains(BLOCK_END) || lines[j].contains(LEGACY_BLOCK_END));

        match end {
            Some(end) => {
                lines.drain(i..=end);
                removed += 1;
                // Re-check the same index, the next block may start here now
            }
            None => i += 1,
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;

    fn to_lines(source: &str) -> Vec<String> {
        source.lines().map(str::to_string).collect()
    }

    fn route(line: usize, locations: &[&str]) -> ReportedRoute {
        ReportedRoute {
            method: HttpMethod::Get,
            path: "/api/v1/cars".to_string(),
            backend_file: "app/api/v1/cars.py".to_string(),
            line,
            handler: "list_cars".to_string(),
            usage_locations: locations.iter().map(|s| s.to_string()).collect(),
            has_usage: !locations.is_empty(),
        }
    }

    #[test]
    fn test_annotate_adds_block_above_decorator() {
        let mut lines = to_lines(
            "import flask\n\n@api.route(\"/cars\")\ndef list_cars():\n    pass",
        );
        let (added, replaced) = annotate_lines(&mut lines, &[route(3, &["web/src/a.ts:10"])]);
        assert_eq!((added, replaced), (1, 0));
        assert_eq!(
            lines,
            to_lines(
                "import flask\n\n# START: USAGES TOOL\n# ./web/src/a.ts:10\n# END: USAGES TOOL\n@api.route(\"/cars\")\ndef list_cars():\n    pass"
            )
        );
    }

    #[test]
    fn test_annotate_lands_above_whole_decorator_stack() {
        // The reported route line is the route decorator, below an
        // auth decorator; the block must go above both.
        let mut lines = to_lines(
            "import flask\n@requires_auth\n@api.route(\"/cars\")\ndef list_cars():\n    pass",
        );
        annotate_lines(&mut lines, &[route(3, &[])]);
        assert_eq!(lines[1], BLOCK_START);
        assert_eq!(lines[2], "# No Usages: Please Check Before Deleting");
        assert_eq!(lines[3], BLOCK_END);
        assert_eq!(lines[4], "@requires_auth");
    }

    #[test]
    fn test_annotate_at_top_of_file() {
        let mut lines = to_lines("@api.route(\"/cars\")\ndef list_cars():\n    pass");
        annotate_lines(&mut lines, &[route(1, &[])]);
        assert_eq!(lines[0], BLOCK_START);
        assert_eq!(lines[3], "@api.route(\"/cars\")");
    }

    #[test]
    fn test_annotate_replaces_existing_block() {
        let mut lines = to_lines(
            "# START: USAGES TOOL\n# ./old/location.ts:1\n# END: USAGES TOOL\n@api.route(\"/cars\")\ndef list_cars():\n    pass",
        );
        let (added, replaced) = annotate_lines(&mut lines, &[route(4, &["web/src/new.ts:2"])]);
        assert_eq!((added, replaced), (0, 1));
        assert_eq!(lines[1], "# ./web/src/new.ts:2");
        assert!(!lines.iter().any(|l| l.contains("old/location")));
    }

    #[test]
    fn test_routes_on_same_line_are_merged_without_duplicates() {
        let mut lines = to_lines("@api.route(\"/a\")\n@api.route(\"/b\")\ndef handle():\n    pass");
        let routes = vec![
            route(1, &["web/src/a.ts:1", "web/src/shared.ts:5"]),
            route(1, &["web/src/shared.ts:5", "web/src/b.ts:2"]),
        ];
        let (added, _) = annotate_lines(&mut lines, &routes);
        assert_eq!(added, 1);
        assert_eq!(lines[1], "# ./web/src/a.ts:1");
        assert_eq!(lines[2], "# ./web/src/shared.ts:5");
        assert_eq!(lines[3], "# ./web/src/b.ts:2");
        assert_eq!(lines[4], BLOCK_END);
    }

    #[test]
    fn test_bottom_up_processing_keeps_line_numbers_valid() {
        let mut lines = to_lines(
            "@api.route(\"/a\")\ndef a():\n    pass\n\n@api.route(\"/b\")\ndef b():\n    pass",
        );
        let routes = vec![route(1, &["web/src/a.ts:1"]), route(5, &["web/src/b.ts:2"])];
        annotate_lines(&mut lines, &routes);
        // Both decorators still directly follow their blocks
        let a_pos = lines.iter().position(|l| l.contains("/a")).unwrap();
        let b_pos = lines.iter().position(|l| l.contains("/b")).unwrap();
        assert_eq!(lines[a_pos - 1], BLOCK_END);
        assert_eq!(lines[b_pos - 1], BLOCK_END);
    }

    #[test]
    fn test_remove_all_blocks_handles_both_marker_generations() {
        let mut lines = to_lines(
            "# START: USAGES TOOL\n# ./a.ts:1\n# END: USAGES TOOL\n@api.route(\"/a\")\ndef a():\n    pass\n# START: ROUTE USAGES TOOL\n# ./b.ts:2\n# END: ROUTE USAGES TOOL\n@api.route(\"/b\")\ndef b():\n    pass",
        );
        let removed = remove_all_blocks(&mut lines);
        assert_eq!(removed, 2);
        assert!(!lines.iter().any(|l| l.contains("USAGES TOOL")));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_remove_adjacent_blocks() {
        let mut lines = to_lines(
            "# START: USAGES TOOL\n# END: USAGES TOOL\n# START: USAGES TOOL\n# END: USAGES TOOL\ncode = 1",
        );
        let removed = remove_all_blocks(&mut lines);
        assert_eq!(removed, 2);
        assert_eq!(lines, vec!["code = 1"]);
    }

    #[test]
    fn test_block_wrapping_stray_code_is_replaced_without_panicking() {
        // A hand-edited file can leave a code line between the
        // markers; the insertion point then lands inside the block
        // and the replacement must clamp rather than underflow.
        let mut lines = to_lines(
            "# START: USAGES TOOL\nx = 1\n# END: USAGES TOOL\n@api.route(\"/a\")\ndef a():\n    pass",
        );
        let (added, replaced) = annotate_lines(&mut lines, &[route(4, &["web/src/a.ts:1"])]);
        assert_eq!((added, replaced), (0, 1));
        assert_eq!(lines[0], BLOCK_START);
        assert_eq!(lines[1], "# ./web/src/a.ts:1");
        assert_eq!(lines[2], BLOCK_END);
        assert_eq!(lines[3], "@api.route(\"/a\")");
    }

    #[test]
    fn test_unterminated_block_is_left_alone() {
        let mut lines = to_lines("# START: USAGES TOOL\ncode = 1");
        let removed = remove_all_blocks(&mut lines);
        assert_eq!(removed, 0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_annotate_roundtrip_is_idempotent() {
        let original = "import flask\n\n@api.route(\"/cars\")\ndef list_cars():\n    pass";
        let mut lines = to_lines(original);
        annotate_lines(&mut lines, &[route(3, &["web/src/a.ts:10"])]);
        let annotated = lines.clone();

        // A fresh audit of the annotated file reports the decorator at
        // its shifted line; annotating again replaces the block in place.
        let (added, replaced) = annotate_lines(&mut lines, &[route(6, &["web/src/a.ts:10"])]);
        assert_eq!((added, replaced), (0, 1));
        assert_eq!(lines, annotated);

        // Cleaning restores the original
        remove_all_blocks(&mut lines);
        assert_eq!(lines, to_lines(original));
    }
}
