//! Error types for the comb filter engine.

use thiserror::Error;

/// Errors raised by the DSP layer.
///
/// Parameters are validated before any sample is touched, so an error never
/// comes with a partially filled output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombError {
    /// Non-positive sample rate, negative or non-finite delay, empty input...
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Buffer shapes differ, described as `channels x frames`.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl CombError {
    pub(crate) fn shape(
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

/// Result type for DSP operations
pub type CombResult<T> = Result<T, CombError>;
