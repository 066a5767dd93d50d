//! Error types for the qcdash library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dashboard operations.
///
/// Every variant is local and non-retryable: a failed load leaves the store
/// untouched and a failed query returns nothing partial.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input could not be parsed as tabular data.
    #[error("Unreadable file: {0}")]
    Unreadable(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the Parquet/Arrow readers.
    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Malformed or empty dataset (no columns, no rows).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Overlay columns do not match the baseline columns.
    #[error(
        "Overlay columns do not match baseline (missing: [{}], unexpected: [{}])",
        missing.join(", "),
        unexpected.join(", ")
    )]
    SchemaMismatch {
        /// Baseline columns absent from the overlay.
        missing: Vec<String>,
        /// Overlay columns absent from the baseline.
        unexpected: Vec<String>,
    },

    /// Filter references a column that is not in the loaded schema.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// A filter expression could not be parsed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Query or stats invoked before any baseline was loaded.
    #[error("No data loaded. Load a baseline file first.")]
    NoDataLoaded,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Short machine-readable name for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Io { .. } => "io",
            DashboardError::Unreadable(_) | DashboardError::Csv(_) => "unreadable_file",
            #[cfg(feature = "parquet")]
            DashboardError::Parquet(_) => "unreadable_file",
            DashboardError::UnsupportedFormat(_) => "unsupported_format",
            DashboardError::Schema(_) => "schema",
            DashboardError::SchemaMismatch { .. } => "schema_mismatch",
            DashboardError::UnknownColumn(_) => "unknown_column",
            DashboardError::InvalidFilter(_) => "invalid_filter",
            DashboardError::NoDataLoaded => "no_data_loaded",
            DashboardError::Json(_) => "json",
        }
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
