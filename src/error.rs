//! Error types for the failcast pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FailcastError>;

/// Main error type for the failcast pipeline.
///
/// The first five variants are the declared termination paths of the batch
/// pipeline; the rest cover ambient data and model failures. There are no
/// retries anywhere: every error carries enough context (stage, column,
/// unit) to diagnose a run without re-running it.
#[derive(Error, Debug)]
pub enum FailcastError {
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("No max cycle computed for unit {0}")]
    MissingUnit(i64),

    /// A unit trajectory shorter than the rolling window is not an error on
    /// its own; it only surfaces here when every unit is too short and the
    /// assembled table ends up empty.
    #[error("Empty dataset after {stage}: {detail}")]
    EmptyDataset { stage: String, detail: String },

    #[error("Write failure: {0}")]
    WriteFailure(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for FailcastError {
    fn from(err: polars::error::PolarsError) -> Self {
        FailcastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FailcastError {
    fn from(err: serde_json::Error) -> Self {
        FailcastError::DataError(err.to_string())
    }
}
