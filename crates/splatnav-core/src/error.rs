//! Error types for splatnav.

use thiserror::Error;

/// The main error type for splatnav operations.
///
/// Most of the interactive API is infallible by design (out-of-range indices
/// are ignored, out-of-range parameters are clamped); errors are reserved for
/// malformed scene data and snapshot I/O.
#[derive(Error, Debug)]
pub enum SplatnavError {
    /// A flat position buffer whose length is not a whole number of points.
    #[error("position buffer length {actual} is not a multiple of {expected_multiple}")]
    SizeMismatch {
        expected_multiple: usize,
        actual: usize,
    },

    /// Scene data contained a NaN or infinite coordinate.
    #[error("non-finite position at point index {index}")]
    NonFinitePosition { index: usize },

    /// I/O error while reading or writing a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for splatnav operations.
pub type Result<T> = std::result::Result<T, SplatnavError>;
