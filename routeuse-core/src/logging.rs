//! Structured logging setup using **tracing**.
//!
//! Diagnostics go to stderr so stdout stays clean for summaries; the
//! JSON subscriber keeps the audit trail machine-readable.

/// Initializes the global tracing collector (subscriber).
///
/// Call *once* at the beginning of the process. Per-file scan warnings
/// and stage progress are emitted through this collector.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=routeuse=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
