//! Error types for museum-eda
//!
//! Every failure names the collection or file it belongs to, so one broken
//! dataset can be reported without hiding the others.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// museum-eda error types
#[derive(Error, Debug)]
pub enum Error {
    /// Dataset file missing, unreadable, or not parsable as a table
    #[error("Load error: {}: {reason}", path.display())]
    Load {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// A role or grouping column does not exist in the collection schema
    #[error("Column '{column}' not found in collection '{collection}'\nCheck the column role mapping for this dataset")]
    MissingColumn {
        /// Collection name
        collection: String,
        /// Requested column name
        column: String,
    },

    /// Two summary rows share one collection name
    #[error("Duplicate collection in comparison table: {0}")]
    DuplicateCollection(String),

    /// Invalid parameter or unsupported data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::Load`] for `path`
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`Error::MissingColumn`]
    pub(crate) fn missing_column(collection: &str, column: &str) -> Self {
        Self::MissingColumn {
            collection: collection.to_string(),
            column: column.to_string(),
        }
    }
}
