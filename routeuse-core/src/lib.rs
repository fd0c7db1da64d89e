//! routeuse-core: route usage auditing for Flask-style backends
//!
//! This library pairs route declarations found in a Python backend
//! with the HTTP call-sites that reference them in one or more
//! TypeScript/JavaScript frontends, then reports which routes are
//! exercised and which are not.
//!
//! # Features
//!
//! - **Route extraction**: Find `@group.route(...)` decorators, with
//!   stacked decorators, multi-line argument lists, and explicit
//!   method lists handled
//! - **Call-site extraction**: Find client calls, `fetch` calls,
//!   wrapper functions, and instance-qualified calls in frontend code
//! - **Fuzzy matching**: Pair observed URLs with route templates,
//!   stripping host template variables and accepting dynamic segments
//! - **Split reports**: One markdown report for used routes, one for
//!   unused routes
//! - **Annotation**: Write, replace, and remove usage-comment blocks
//!   above route definitions from the report files
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use routeuse_core::prelude::*;
//!
//! let result = RouteAudit::new("backend")
//!     .frontend("frontend_web")
//!     .run()?;
//!
//! for m in result.unused() {
//!     println!("unused: {}", m.endpoint.usage_key());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`routes`]: Route decorator extraction and group prefix tables
//! - [`usages`]: Frontend call-site extraction
//! - [`matcher`]: Route/call-site pairing
//! - [`report`]: Markdown report generation and parse-back
//! - [`audit`]: The builder that drives the whole pipeline
//! - [`annotate`]: Usage-comment blocks in backend sources
//! - [`scan`]: Parallel file discovery
//! - [`config`]: routeuse.toml loading
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `annotate` (default): Enable the annotation pass

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod method;
pub mod prelude;
pub mod report;
pub mod routes;
pub mod scan;
pub mod usages;

#[cfg(feature = "annotate")]
pub mod annotate;

// Error types
pub use error::{IoResultExt, RouteuseError, RouteuseResult};

// Audit API
pub use audit::{AuditResult, RouteAudit};

// Configuration
pub use config::{load_config, GroupsConfig, RouteuseConfig};

// Logging
pub use logging::init_structured_logging;

// Matching
pub use matcher::{PathMatcher, RouteMatch};

// Methods
pub use method::HttpMethod;

// Reporting
pub use report::{
    parse_report, write_reports, ReportSummary, ReportedRoute, WITHOUT_USAGE_REPORT,
    WITH_USAGE_REPORT,
};

// Route extraction
pub use routes::{Endpoint, RouteExtractor, RouteGroups};

// File scanning
pub use scan::{gather_backend_files, gather_frontend_files, gather_python_files};

// Call-site extraction
pub use usages::{total_usages, usage_key, Usage, UsageExtractor, UsageMap};

// Annotation
#[cfg(feature = "annotate")]
pub use annotate::{
    annotate_backend, clean_backend, remove_all_blocks, AnnotateSummary, CleanSummary,
};
