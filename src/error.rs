//! Error type shared by the transform functions.

use thiserror::Error;

/// Failures the transforms report explicitly instead of producing
/// nonsensical output. Row-level problems (bad dates, malformed records)
/// are not errors; those rows are skipped and counted.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("sample is empty")]
    EmptySample,

    #[error("window size must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("column '{0}' not found in header")]
    MissingColumn(String),

    #[error("no sensor columns after the timestamp column")]
    NoSensorColumns,

    #[error("percentage change undefined: first value is zero")]
    ZeroBaseline,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, TransformError>;
