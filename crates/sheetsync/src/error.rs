//! CLI error types

use thiserror::Error;

use sheetsync_core::sync::SyncError;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Bad or conflicting arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A capability was compiled out
    #[error("Feature not available: {0}")]
    FeatureNotAvailable(String),

    /// Some tables could not be planned or synced
    #[error("{failed} of {total} table(s) failed")]
    TablesFailed { failed: usize, total: usize },

    /// Output could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            CliError::Sync(e) => e.user_message(),
            CliError::FeatureNotAvailable(what) => {
                format!(
                    "{what} is not available in this build.\n\n\
                    Hint: Rebuild with --features cli-full."
                )
            }
            CliError::TablesFailed { failed, total } => {
                format!(
                    "{failed} of {total} table(s) failed; see the messages above.\n\n\
                    Hint: Run with -v for per-table logs."
                )
            }
            _ => self.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::TablesFailed { .. } => 2,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
