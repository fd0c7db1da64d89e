//! The audit pipeline: extract routes, extract usages, match.
//!
//! [`RouteAudit`] is a builder over the scan roots; `run` validates
//! them up front and then drives the three stages in order. Root
//! validation is strict where per-file handling is lenient: a missing
//! configured directory fails the audit before any scanning starts,
//! while unreadable files inside an existing root are skipped with a
//! warning.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{RouteuseError, RouteuseResult};
use crate::matcher::{PathMatcher, RouteMatch};
use crate::report::{self, ReportSummary};
use crate::routes::{RouteExtractor, RouteGroups};
use crate::usages::{self, UsageExtractor, UsageMap};

/// Builder for one audit run.
#[derive(Debug, Clone)]
pub struct RouteAudit {
    backend_root: PathBuf,
    api_subpath: String,
    frontend_roots: Vec<PathBuf>,
    frontend_src_subpath: String,
    groups: RouteGroups,
}

impl RouteAudit {
    pub fn new(backend_root: impl Into<PathBuf>) -> Self {
        Self {
            backend_root: backend_root.into(),
            api_subpath: "app/api/v1".to_string(),
            frontend_roots: Vec::new(),
            frontend_src_subpath: "src".to_string(),
            groups: RouteGroups::default(),
        }
    }

    pub fn api_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.api_subpath = subpath.into();
        self
    }

    pub fn frontend(mut self, root: impl Into<PathBuf>) -> Self {
        self.frontend_roots.push(root.into());
        self
    }

    pub fn frontends(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.frontend_roots.extend(roots);
        self
    }

    pub fn frontend_src_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.frontend_src_subpath = subpath.into();
        self
    }

    pub fn groups(mut self, groups: RouteGroups) -> Self {
        self.groups = groups;
        self
    }

    /// Run the full pipeline.
    pub fn run(&self) -> RouteuseResult<AuditResult> {
        self.validate()?;

        info!(backend = %self.backend_root.display(), api = %self.api_subpath, "extracting routes");
        let extractor = RouteExtractor::new(self.groups.clone());
        let endpoints = extractor.extract_dir(&self.backend_root, &self.api_subpath);
        info!(routes = endpoints.len(), "route extraction done");

        let usage_extractor = UsageExtractor::new();
        let mut usage_map = UsageMap::new();
        for frontend in &self.frontend_roots {
            info!(frontend = %frontend.display(), "extracting call-sites");
            usage_extractor.extract_dir(frontend, &self.frontend_src_subpath, &mut usage_map);
        }
        info!(
            call_sites = usages::total_usages(&usage_map),
            unique_keys = usage_map.len(),
            "usage extraction done"
        );

        let matches = PathMatcher::new().match_routes(&endpoints, &usage_map);
        Ok(AuditResult { matches, usage_map })
    }

    fn validate(&self) -> RouteuseResult<()> {
        if !self.backend_root.exists() {
            return Err(RouteuseError::missing_path(&self.backend_root));
        }
        if self.frontend_roots.is_empty() {
            return Err(RouteuseError::invalid_argument(
                "at least one frontend root is required",
            ));
        }
        for frontend in &self.frontend_roots {
            if !frontend.exists() {
                return Err(RouteuseError::missing_path(frontend));
            }
        }
        Ok(())
    }
}

/// Everything one audit run produced.
#[derive(Debug, Clone)]
pub struct AuditResult {
    /// Every declared route, in extraction order, with its call-sites.
    pub matches: Vec<RouteMatch>,
    /// The raw call-site map, in discovery order.
    pub usage_map: UsageMap,
}

impl AuditResult {
    pub fn used(&self) -> impl Iterator<Item = &RouteMatch> {
        self.matches.iter().filter(|m| m.is_used())
    }

    pub fn unused(&self) -> impl Iterator<Item = &RouteMatch> {
        self.matches.iter().filter(|m| !m.is_used())
    }

    pub fn total_call_sites(&self) -> usize {
        usages::total_usages(&self.usage_map)
    }

    /// Write both reports for this result.
    pub fn write_reports(
        &self,
        with_path: &Path,
        without_path: &Path,
    ) -> RouteuseResult<ReportSummary> {
        report::write_reports(&self.matches, with_path, without_path)
    }
}
