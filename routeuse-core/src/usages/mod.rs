//! Observed frontend call-sites.

mod usage_extractor;

pub use usage_extractor::UsageExtractor;

use crate::method::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One observed HTTP call-site in frontend code.
///
/// A single physical construct can produce several records when it
/// matches more than one recognized call shape; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Source file, relative to the directory containing the frontend root.
    pub file: String,
    /// 1-based line of the match start.
    pub line: usize,
    /// The trimmed source line, for report snippets.
    pub snippet: String,
}

/// Call-sites grouped by `"METHOD url"` key, discovery order preserved.
pub type UsageMap = IndexMap<String, Vec<Usage>>;

/// Build the composite key a call-site is grouped under.
pub fn usage_key(method: HttpMethod, url: &str) -> String {
    format!("{} {}", method, url)
}

/// Total number of recorded call-sites across all keys.
pub fn total_usages(map: &UsageMap) -> usize {
    map.values().map(Vec::len).sum()
}
