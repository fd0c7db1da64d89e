//! HTTP methods recognized in route declarations and call-sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five methods the audit understands.
///
/// Variants are declared in lexicographic name order so the derived
/// `Ord` matches sorting by method name, which the reports rely on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl HttpMethod {
    /// Upper-case name, as used in usage-map keys and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }

    /// Parse a method token case-insensitively.
    ///
    /// Unrecognized tokens (OPTIONS, HEAD, typos) yield `None` and are
    /// silently skipped by callers, the same way unmatched decorator
    /// syntax is treated as "not a route".
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DELETE" => Some(Self::Delete),
            "GET" => Some(Self::Get),
            "PATCH" => Some(Self::Patch),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
