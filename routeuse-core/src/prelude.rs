//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use routeuse_core::prelude::*;
//! ```

// Core audit types
pub use crate::audit::{AuditResult, RouteAudit};
pub use crate::error::{RouteuseError, RouteuseResult};

// Extraction
pub use crate::routes::{Endpoint, RouteExtractor, RouteGroups};
pub use crate::usages::{Usage, UsageExtractor, UsageMap};

// Matching
pub use crate::matcher::{PathMatcher, RouteMatch};

// Reporting
pub use crate::report::{parse_report, write_reports, ReportSummary, ReportedRoute};

// Configuration
pub use crate::config::{load_config, RouteuseConfig};

// Annotation
#[cfg(feature = "annotate")]
pub use crate::annotate::{annotate_backend, clean_backend, AnnotateSummary, CleanSummary};
