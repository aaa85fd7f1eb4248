//! Error types for sync operations
//!
//! Errors chain for debugging and also provide user-facing messages with
//! hints for CLI output.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while syncing sheets into tables
#[derive(Error, Debug)]
pub enum SyncError {
    /// Row source returned something unusable
    #[error("Source error: {0}")]
    Source(String),

    /// HTTP transport failure while fetching rows
    #[cfg(feature = "http-source")]
    #[error("HTTP error: {0}")]
    Http(String),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(String),

    /// Two sheet columns map to the same table column
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Table or column name unusable after sanitization
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    /// Sheet payload is not a list of row objects
    #[error("Invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Config file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse error
    #[error("Config parse error: {0}")]
    Toml(String),
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Shorthand for a database error from any displayable driver error
    pub fn database(err: impl std::fmt::Display) -> Self {
        SyncError::Database(err.to_string())
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Source(msg) => {
                format!(
                    "Could not read sheet data: {msg}\n\n\
                    Hint: The source must return a JSON object mapping sheet names to arrays of rows."
                )
            }
            #[cfg(feature = "http-source")]
            SyncError::Http(msg) => {
                format!(
                    "Failed to fetch sheet data: {msg}\n\n\
                    Hint: Check APPS_SCRIPT_URL and that the script is deployed for anonymous access."
                )
            }
            SyncError::Database(msg) => {
                format!(
                    "Database error: {msg}\n\n\
                    Hint: Check DATABASE_URI and that the database is reachable."
                )
            }
            SyncError::DuplicateColumn { table, column } => {
                format!(
                    "Table '{table}' has more than one column named '{column}' after sanitization.\n\n\
                    Hint: Rename the sheet headers so they differ in letters or digits. \
                    'id' is reserved for the generated primary key."
                )
            }
            SyncError::InvalidConfig(msg) => {
                format!("Invalid configuration: {msg}\n\nHint: Check your sync configuration file.")
            }
            SyncError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\nHint: Check that the file exists and the path is correct.",
                    path.display()
                )
            }
            SyncError::Toml(msg) => {
                format!("Could not parse config file: {msg}\n\nHint: Check the TOML syntax.")
            }
            _ => self.to_string(),
        }
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Toml(err.to_string())
    }
}

#[cfg(feature = "duckdb-backend")]
impl From<duckdb::Error> for SyncError {
    fn from(err: duckdb::Error) -> Self {
        SyncError::Database(err.to_string())
    }
}

#[cfg(feature = "postgres-backend")]
impl From<tokio_postgres::Error> for SyncError {
    fn from(err: tokio_postgres::Error) -> Self {
        SyncError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_message() {
        let err = SyncError::DuplicateColumn {
            table: "Orders".into(),
            column: "Order_1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate column 'Order_1' in table 'Orders'"
        );
        assert!(err.user_message().contains("Hint:"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: SyncError = ValidationError::Empty {
            field: "table name",
        }
        .into();
        assert_eq!(err.to_string(), "Invalid identifier: table name cannot be empty");
    }

    #[test]
    fn test_toml_error_converts() {
        let parsed: Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: SyncError = parsed.unwrap_err().into();
        assert!(matches!(err, SyncError::Toml(_)));
    }
}
