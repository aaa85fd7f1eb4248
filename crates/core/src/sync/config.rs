//! Sync configuration types

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{SyncError, SyncResult};
use super::plan::SqlDialect;
use crate::inference::InferenceConfig;

/// Environment variable holding the sheet export endpoint
pub const SOURCE_URL_ENV: &str = "APPS_SCRIPT_URL";

/// Environment variable holding the database connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URI";

/// Placeholder left in connection strings copied from a dashboard
pub const PASSWORD_PLACEHOLDER: &str = "[YOUR-PASSWORD]";

/// Main sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Where rows come from
    pub source: SourceConfig,
    /// Where tables are written
    pub database: DatabaseConfig,
    /// Ask PostgREST to reload its schema cache after each table is replaced
    pub notify_schema_reload: bool,
    /// Build plans only; never touch the database
    pub dry_run: bool,
    /// Column type resolution settings
    pub inference: InferenceConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            database: DatabaseConfig::default(),
            notify_schema_reload: true,
            dry_run: false,
            inference: InferenceConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyncError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> SyncResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary variable lookup
    ///
    /// Blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(SOURCE_URL_ENV) {
            self.source.url = Some(url);
        }
        if let Some(url) = non_blank(DATABASE_URL_ENV) {
            self.database.url = Some(url);
        }
    }

    /// Set the source URL
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source.url = Some(url.into());
        self
    }

    /// Target a PostgreSQL database
    pub fn with_postgres(mut self, url: impl Into<String>) -> Self {
        self.database.backend = DatabaseBackend::Postgres;
        self.database.url = Some(url.into());
        self
    }

    /// Target a DuckDB database file
    pub fn with_duckdb(mut self, path: impl Into<PathBuf>) -> Self {
        self.database.backend = DatabaseBackend::DuckDb;
        self.database.path = Some(path.into());
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable the schema reload notification
    pub fn with_notify_schema_reload(mut self, notify: bool) -> Self {
        self.notify_schema_reload = notify;
        self
    }

    /// Set inference configuration
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Check the settings needed to fetch over HTTP
    pub fn validate_source(&self) -> Result<(), String> {
        match self.source.url.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(format!(
                    "Source URL is required (set [source] url or {SOURCE_URL_ENV})"
                ));
            }
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                return Err(format!("Source URL must use http or https: {url}"));
            }
            _ => {}
        }

        if self.source.timeout_seconds == 0 {
            return Err("Source timeout must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Check the settings needed to write to the database
    pub fn validate_database(&self) -> Result<(), String> {
        match self.database.backend {
            DatabaseBackend::Postgres => {
                let url = self
                    .database
                    .url
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| {
                        format!(
                            "Database URL is required for postgres (set [database] url or {DATABASE_URL_ENV})"
                        )
                    })?;
                if url.contains(PASSWORD_PLACEHOLDER) {
                    return Err(format!(
                        "Database URL still contains the {PASSWORD_PLACEHOLDER} placeholder"
                    ));
                }
            }
            DatabaseBackend::DuckDb => {
                if self.database.path.is_none() {
                    return Err("Database path is required for duckdb".to_string());
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration for a full sync
    pub fn validate(&self) -> Result<(), String> {
        self.validate_source()?;
        if !self.dry_run {
            self.validate_database()?;
        }
        Ok(())
    }
}

/// Row source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Endpoint returning `{sheet name: [row, ...]}`
    pub url: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: 30,
        }
    }
}

/// Database target settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Connection string (postgres)
    pub url: Option<String>,
    /// Database file (duckdb)
    pub path: Option<PathBuf>,
}

/// Supported database backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    DuckDb,
}

impl DatabaseBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::DuckDb => "duckdb",
        }
    }

    /// SQL dialect spoken by this backend
    pub fn dialect(&self) -> SqlDialect {
        match self {
            Self::Postgres => SqlDialect::Postgres,
            Self::DuckDb => SqlDialect::DuckDb,
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "duckdb" => Ok(Self::DuckDb),
            _ => Err(format!("Unknown database backend: {s}")),
        }
    }
}
