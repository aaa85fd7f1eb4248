//! Error types for column type resolution

use thiserror::Error;

/// Errors raised while feeding rows to the resolver
///
/// Classifying a value never fails; these cover malformed input only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Row was not a JSON object
    #[error("Invalid row structure: expected object, found {0}")]
    InvalidStructure(String),
}

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;
