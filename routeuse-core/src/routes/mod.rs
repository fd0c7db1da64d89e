//! Declared backend routes.
//!
//! An [`Endpoint`] is one method/path combination registered by a
//! route decorator; a handler with stacked decorators or an explicit
//! method list yields several endpoints that all share the first
//! decorator's source line.

mod route_extractor;
mod route_groups;

pub use route_extractor::RouteExtractor;
pub use route_groups::RouteGroups;

use crate::method::HttpMethod;
use serde::{Deserialize, Serialize};

/// One declared backend route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Path template as written, may contain `<id>` style dynamic segments.
    pub path: String,
    /// Source file, relative to the backend root.
    pub file: String,
    /// 1-based line of the first decorator in the stack.
    pub line: usize,
    /// Handler function name, or "unknown" if none was found.
    pub handler: String,
    /// Static URL prefix resolved from the route group.
    pub prefix: String,
}

impl Endpoint {
    /// Full route path including the group prefix.
    pub fn full_path(&self) -> String {
        format!("{}{}", self.prefix, self.path)
    }

    /// The exact usage-map key this endpoint corresponds to.
    pub fn usage_key(&self) -> String {
        format!("{} {}", self.method, self.full_path())
    }
}
