//! Typed error handling for routeuse.
//!
//! Provides structured errors that library consumers can match on,
//! with the path context needed to report where an audit went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for routeuse operations.
#[derive(Error, Debug)]
pub enum RouteuseError {
    /// I/O error when reading source files or writing reports
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A required root directory does not exist
    #[error("path not found: {path}")]
    MissingPath { path: PathBuf },

    /// Configuration file errors
    #[error("config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Report file could not be written or parsed back
    #[error("report error at {path}: {message}")]
    Report { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Generic internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RouteuseError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a missing-path error. These are fatal: the audit refuses
    /// to start when a configured root does not exist.
    pub fn missing_path(path: impl Into<PathBuf>) -> Self {
        Self::MissingPath { path: path.into() }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (skip the file, continue the scan).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Config { .. } | Self::Report { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::MissingPath { path } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Report { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for routeuse results.
pub type RouteuseResult<T> = Result<T, RouteuseError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> RouteuseResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> RouteuseResult<T> {
        self.map_err(|e| RouteuseError::io(path, e))
    }
}
