//! Identifier sanitization and validation.
//!
//! Sheet and column names arrive as arbitrary user text. Before they reach
//! any SQL statement they are reduced to letters, digits and underscores,
//! checked against the backend's identifier limit, and finally quoted.

use serde::Serialize;
use thiserror::Error;

/// Longest identifier PostgreSQL keeps without truncation (`NAMEDATALEN - 1`)
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Errors that can occur during identifier validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValidationError {
    /// Identifier is empty after sanitization
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Identifier exceeds the backend limit
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Replace every character that is not a letter or digit with `_`.
///
/// Letters and digits from any script are kept, so `Café` stays `Café`.
///
/// # Examples
///
/// ```
/// use sheetsync_core::validation::input::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Order #1"), "Order__1");
/// assert_eq!(sanitize_identifier("due-date"), "due_date");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Quote an identifier for use in a SQL statement.
///
/// Both supported backends use standard double quotes; embedded quotes are
/// doubled.
///
/// # Examples
///
/// ```
/// use sheetsync_core::validation::input::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "\"users\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Validate a sanitized identifier.
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 63 bytes
pub fn validate_identifier(field: &'static str, name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENTIFIER_LENGTH,
            actual: name.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Order #1"), "Order__1");
        assert_eq!(sanitize_identifier("plain"), "plain");
        assert_eq!(sanitize_identifier("a b.c/d"), "a_b_c_d");
        assert_eq!(sanitize_identifier("under_score"), "under_score");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn test_sanitize_identifier_unicode() {
        assert_eq!(sanitize_identifier("Café"), "Café");
        assert_eq!(sanitize_identifier("金额 (¥)"), "金额____");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Sheet1"), "\"Sheet1\"");
        assert_eq!(quote_identifier("x\"y"), "\"x\"\"y\"");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("column name", "ok").is_ok());
        assert_eq!(
            validate_identifier("table name", ""),
            Err(ValidationError::Empty {
                field: "table name"
            })
        );

        let long = "a".repeat(64);
        match validate_identifier("column name", &long) {
            Err(ValidationError::TooLong { max, actual, .. }) => {
                assert_eq!(max, 63);
                assert_eq!(actual, 64);
            }
            other => panic!("expected TooLong, got {other:?}"),
        }
        assert!(validate_identifier("column name", &"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_validate_counts_bytes() {
        // 32 two-byte characters
        let name = "é".repeat(32);
        assert!(validate_identifier("column name", &name).is_err());
    }
}
