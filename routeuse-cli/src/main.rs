//! routeuse CLI - route usage auditor for Flask-style monorepos.
//!
//! Modes:
//! - default: audit the monorepo and write the two markdown reports
//! - `--annotate`: apply comment blocks from existing reports
//! - `--clean`: strip all comment blocks from backend sources
//! - `--sync`: clean, re-audit, and annotate in one pass

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use routeuse_core::{
    annotate_backend, clean_backend, init_structured_logging, load_config, AnnotateSummary,
    CleanSummary, ReportSummary, RouteAudit, RouteGroups, WITHOUT_USAGE_REPORT, WITH_USAGE_REPORT,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Audit which backend HTTP routes are actually used by frontend code"
)]
pub struct Cli {
    /// Monorepo root containing the backend and frontend directories
    #[arg(default_value = ".")]
    path: String,

    /// Backend root directory, relative to the monorepo root
    #[arg(long)]
    backend: Option<String>,

    /// API subdirectory within the backend (e.g. app/api/v1)
    #[arg(long)]
    api_path: Option<String>,

    /// Frontend root directories, relative to the monorepo root
    #[arg(long, num_args = 1..)]
    frontends: Vec<String>,

    /// Source subdirectory within each frontend (e.g. src)
    #[arg(long)]
    frontend_src: Option<String>,

    /// Output file for the routes-with-usage report
    #[arg(long)]
    with_usage: Option<String>,

    /// Output file for the routes-without-usage report
    #[arg(long)]
    without_usage: Option<String>,

    /// Write usage comment blocks into backend sources from existing reports
    #[arg(long)]
    annotate: bool,

    /// Remove all usage comment blocks from backend sources
    #[arg(long)]
    clean: bool,

    /// Clean, re-run the audit, and annotate in one pass
    #[arg(long)]
    sync: bool,

    /// Show what would change without writing backend files
    #[arg(long)]
    dry_run: bool,

    /// Output the summary in JSON format
    #[arg(long)]
    json: bool,
}

/// Effective settings after merging flags over routeuse.toml over
/// built-in defaults.
struct Settings {
    backend: PathBuf,
    api_path: String,
    frontends: Vec<PathBuf>,
    frontend_src: String,
    with_path: PathBuf,
    without_path: PathBuf,
    groups: RouteGroups,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let root = PathBuf::from(&cli.path);
        let config = load_config(&root)
            .with_context(|| format!("Failed to load config under {}", root.display()))?
            .unwrap_or_default();

        let backend = cli
            .backend
            .clone()
            .or(config.backend)
            .unwrap_or_else(|| "backend".to_string());
        let api_path = cli
            .api_path
            .clone()
            .or(config.api_path)
            .unwrap_or_else(|| "app/api/v1".to_string());
        let frontends = if cli.frontends.is_empty() {
            config
                .frontends
                .unwrap_or_else(|| vec!["frontend".to_string()])
        } else {
            cli.frontends.clone()
        };
        let frontend_src = cli
            .frontend_src
            .clone()
            .or(config.frontend_src)
            .unwrap_or_else(|| "src".to_string());

        let with_usage = cli
            .with_usage
            .clone()
            .or(config.with_usage_report)
            .unwrap_or_else(|| WITH_USAGE_REPORT.to_string());
        let without_usage = cli
            .without_usage
            .clone()
            .or(config.without_usage_report)
            .unwrap_or_else(|| WITHOUT_USAGE_REPORT.to_string());

        let groups = match config.groups {
            Some(groups_cfg) => {
                RouteGroups::with_overrides(groups_cfg.prefixes, groups_cfg.default_prefix)
            }
            None => RouteGroups::default(),
        };

        Ok(Self {
            backend: root.join(&backend),
            frontends: frontends.iter().map(|f| root.join(f)).collect(),
            with_path: root.join(validate_output_path(&with_usage)?),
            without_path: root.join(validate_output_path(&without_usage)?),
            api_path,
            frontend_src,
            groups,
        })
    }
}

/// Validates report file paths before writing.
///
/// Rejects absolute paths, parent-directory traversal, and null bytes
/// so a config file cannot direct report output outside the monorepo.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }
    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    Ok(p)
}

fn run_audit(settings: &Settings) -> Result<ReportSummary> {
    let result = RouteAudit::new(&settings.backend)
        .api_subpath(&settings.api_path)
        .frontends(settings.frontends.iter().cloned())
        .frontend_src_subpath(&settings.frontend_src)
        .groups(settings.groups.clone())
        .run()
        .context("Audit failed")?;

    let summary = result
        .write_reports(&settings.with_path, &settings.without_path)
        .context("Failed to write reports")?;
    Ok(summary)
}

fn print_audit_summary(cli: &Cli, settings: &Settings, summary: &ReportSummary) {
    if cli.json {
        let output = serde_json::json!({
            "with_usage_report": settings.with_path.display().to_string(),
            "without_usage_report": settings.without_path.display().to_string(),
            "used_routes": summary.used_routes,
            "total_calls": summary.total_calls,
            "unused_routes": summary.unused_routes,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!("Reports generated:");
        println!(
            "  {} ({} routes, {} frontend calls)",
            settings.with_path.display(),
            summary.used_routes,
            summary.total_calls
        );
        println!(
            "  {} ({} routes)",
            settings.without_path.display(),
            summary.unused_routes
        );
    }
}

fn print_annotate_summary(cli: &Cli, summary: &AnnotateSummary, dry_run: bool) {
    if cli.json {
        let output = serde_json::json!({
            "dry_run": dry_run,
            "files_processed": summary.files_processed,
            "files_missing": summary.files_missing,
            "comments_added": summary.comments_added,
            "comments_replaced": summary.comments_replaced,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        let suffix = if dry_run { " (dry run)" } else { "" };
        println!(
            "Annotated {} file(s): {} block(s) added, {} replaced, {} file(s) missing{}",
            summary.files_processed,
            summary.comments_added,
            summary.comments_replaced,
            summary.files_missing,
            suffix
        );
    }
}

fn print_clean_summary(cli: &Cli, summary: &CleanSummary, dry_run: bool) {
    if cli.json {
        let output = serde_json::json!({
            "dry_run": dry_run,
            "files_scanned": summary.files_scanned,
            "files_modified": summary.files_modified,
            "blocks_removed": summary.blocks_removed,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        let suffix = if dry_run { " (dry run)" } else { "" };
        println!(
            "Removed {} block(s) from {} of {} file(s){}",
            summary.blocks_removed, summary.files_modified, summary.files_scanned, suffix
        );
    }
}

fn require_backend(settings: &Settings) -> Result<&Path> {
    if !settings.backend.exists() {
        return Err(anyhow!(
            "Backend path not found: {}",
            settings.backend.display()
        ));
    }
    Ok(&settings.backend)
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] routeuse internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
        std::process::exit(2);
    }));

    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;

    // Clean mode: strip every comment block, then stop
    if cli.clean {
        let backend = require_backend(&settings)?;
        let summary = clean_backend(backend, cli.dry_run).context("Clean failed")?;
        print_clean_summary(&cli, &summary, cli.dry_run);
        return Ok(());
    }

    // Annotate mode: apply existing reports without re-auditing
    if cli.annotate {
        let backend = require_backend(&settings)?;
        let summary = annotate_backend(
            backend,
            &settings.with_path,
            &settings.without_path,
            cli.dry_run,
        )
        .context("Annotation failed")?;
        print_annotate_summary(&cli, &summary, cli.dry_run);
        return Ok(());
    }

    // Sync mode: clean, re-audit, annotate
    if cli.sync {
        let backend = require_backend(&settings)?;
        let clean_summary = clean_backend(backend, cli.dry_run).context("Clean failed")?;
        print_clean_summary(&cli, &clean_summary, cli.dry_run);

        // Reports are regenerated even on a dry run so the annotation
        // preview works from current line numbers.
        let summary = run_audit(&settings)?;
        print_audit_summary(&cli, &settings, &summary);

        let annotate_summary = annotate_backend(
            backend,
            &settings.with_path,
            &settings.without_path,
            cli.dry_run,
        )
        .context("Annotation failed")?;
        print_annotate_summary(&cli, &annotate_summary, cli.dry_run);
        return Ok(());
    }

    // Default mode: audit and write reports
    let summary = run_audit(&settings)?;
    print_audit_summary(&cli, &settings, &summary);
    Ok(())
}
