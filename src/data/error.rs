//! Error types for dataset loading.

use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// The companies dataset could not be made available.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Header lacks one or more required source columns
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Structurally wrong input
    #[error("malformed dataset: {0}")]
    Malformed(String),

    /// File extension the loader does not understand
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
