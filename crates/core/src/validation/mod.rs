//! Validation functionality
//!
//! Identifier sanitization and limits for table and column names.

pub mod input;

pub use input::{
    MAX_IDENTIFIER_LENGTH, ValidationError, ValidationResult, quote_identifier,
    sanitize_identifier, validate_identifier,
};
