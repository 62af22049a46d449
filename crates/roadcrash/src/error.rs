//! Error types for the roadcrash library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ingestion and consolidation.
#[derive(Debug, Error)]
pub enum RoadcrashError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File bytes are not valid in the configured encoding.
    #[error("'{path}' is not valid {encoding}")]
    Encoding { path: PathBuf, encoding: String },

    /// A file has fewer lines than the delimiter sample needs.
    #[error("'{path}' has {found} line(s), delimiter detection needs {required}")]
    InsufficientSample {
        path: PathBuf,
        required: usize,
        found: usize,
    },

    /// Every configured source failed to load.
    #[error("No data loaded: all {attempted} configured file(s) failed, check the CSV sources")]
    NoDataLoaded { attempted: usize },

    /// A text column holds no values, so it has no mode to impute from.
    #[error("Column '{column}' is entirely missing; its mode is undefined")]
    UndefinedMode { column: String },

    /// Required schema fields are absent from the consolidated table.
    #[error("Missing required column(s): {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoadcrashError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for roadcrash operations.
pub type Result<T> = std::result::Result<T, RoadcrashError>;
