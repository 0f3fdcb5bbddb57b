//! Error handling for TransBOM
//!
//! Errors propagate as `anyhow` errors carrying file context; domain failures
//! are described by [`TransBomError`].

use anyhow::Context;
use std::path::Path;

pub type Result<T> = anyhow::Result<T>;

/// Extension trait for Results to add context with file paths
pub trait ResultExt<T> {
    /// Add context with file path information
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Send + Sync + 'static,
{
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T> {
        self.map_err(|e| e.into())
            .with_context(|| format!("Failed to {} file: {}", operation, path.as_ref().display()))
    }
}

/// Specific error types for TransBOM operations
#[derive(Debug, thiserror::Error)]
pub enum TransBomError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid {field} value '{value}' for {designator}")]
    InvalidNumber {
        designator: String,
        field: &'static str,
        value: String,
    },

    #[error("Unknown board side '{side}' for {designator}")]
    UnknownSide { designator: String, side: String },

    #[error("Nothing to do: provide --map, --interactive or --filter-test-points")]
    NoAnnotationMode,

    #[error("Embedded asset not found: {name}")]
    AssetNotFound { name: String },
}
