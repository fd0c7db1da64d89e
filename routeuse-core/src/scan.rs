//! File discovery for the two scan roots.
//!
//! Backend scanning collects Python sources (package-init files are
//! excluded for route extraction); frontend scanning collects the four
//! conventional web-script extensions. Directory pruning happens via
//! `WalkDir::filter_entry` so vendored trees are skipped in O(1).
//!
//! Results are sorted before returning: the usage map preserves
//! discovery order, so file order must be deterministic for the audit
//! to be idempotent across runs.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories to exclude from both scan roots.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "dist",
    "build",
    ".next",
    "coverage",
    "__pycache__",
];

/// Script-like extensions scanned on the frontend side.
const FRONTEND_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn gather_with_filter<F>(root: &Path, keep: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool + Sync,
{
    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        // filter_entry prunes entire subtrees before iteration
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if path.is_file() && keep(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .context(format!("Failed to scan {}", root.display()))?;

    // par_bridge yields in nondeterministic order
    files.sort();
    Ok(files)
}

/// Gathers every .py file under the root, package-init files included.
pub fn gather_python_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_with_filter(root, |p| p.extension().is_some_and(|ext| ext == "py"))
}

/// Gathers backend source files eligible for route extraction:
/// .py files excluding `__init__.py`.
pub fn gather_backend_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_with_filter(root, |p| {
        p.extension().is_some_and(|ext| ext == "py")
            && !p.file_name().is_some_and(|name| name == "__init__.py")
    })
}

/// Gathers frontend script files (.ts, .tsx, .js, .jsx).
pub fn gather_frontend_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_with_filter(root, |p| {
        p.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FRONTEND_EXTENSIONS.contains(&ext))
    })
}

/// Normalizes a path for reporting: relative to `base`, forward slashes.
pub fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
