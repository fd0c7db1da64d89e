//! Configuration loading from routeuse.toml.
//!
//! Every key is optional; command-line flags take precedence over
//! file-sourced values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::Path};

/// Main configuration structure for routeuse.toml.
#[derive(Debug, Deserialize, Default)]
pub struct RouteuseConfig {
    /// Backend root directory.
    pub backend: Option<String>,
    /// API subdirectory within the backend (e.g. "app/api/v1").
    pub api_path: Option<String>,
    /// Frontend root directories.
    pub frontends: Option<Vec<String>>,
    /// Source subdirectory within each frontend (e.g. "src").
    pub frontend_src: Option<String>,
    /// Output file for the routes-with-usage report.
    pub with_usage_report: Option<String>,
    /// Output file for the routes-without-usage report.
    pub without_usage_report: Option<String>,
    /// Route-group prefix configuration.
    pub groups: Option<GroupsConfig>,
}

/// Route-group prefix table from the `[groups]` section.
///
/// Every key except the reserved `default_prefix` is a group
/// identifier mapped to its URL prefix:
///
/// ```toml
/// [groups]
/// default_prefix = "/api/v1"
/// billing_bp = "/api/v1/billing"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct GroupsConfig {
    /// Prefix applied when a group identifier is not in the table.
    pub default_prefix: Option<String>,
    /// Group identifier → URL prefix, merged over the built-in defaults.
    #[serde(flatten)]
    pub prefixes: BTreeMap<String, String>,
}

/// Loads configuration from routeuse.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<RouteuseConfig>> {
    let path = root.join("routeuse.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid routeuse.toml")?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_missing_config() {
        let dir = std::env::temp_dir().join(format!("routeuse_cfg_none_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_full_config() {
        let dir = std::env::temp_dir().join(format!("routeuse_cfg_full_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("routeuse.toml"),
            r#"
backend = "backend"
api_path = "app/api/v1"
frontends = ["web", "landing"]
frontend_src = "src"

[groups]
default_prefix = "/api/v1"
billing_bp = "/api/v1/billing"
"#,
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.backend.as_deref(), Some("backend"));
        assert_eq!(cfg.frontends.as_deref(), Some(&["web".to_string(), "landing".to_string()][..]));
        let groups = cfg.groups.unwrap();
        assert_eq!(groups.default_prefix.as_deref(), Some("/api/v1"));
        assert_eq!(groups.prefixes.get("billing_bp").map(String::as_str), Some("/api/v1/billing"));
        // The reserved key must not leak into the prefix table
        assert!(!groups.prefixes.contains_key("default_prefix"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = std::env::temp_dir().join(format!("routeuse_cfg_bad_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("routeuse.toml"), "frontends = \"not-a-list\"").unwrap();
        assert!(load_config(&dir).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
