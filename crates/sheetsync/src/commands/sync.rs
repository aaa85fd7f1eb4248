//! CLI command for syncing sheets into the database

use std::path::PathBuf;

use crate::error::CliError;
use crate::output::format_report;
use sheetsync_core::inference::SqlType;
use sheetsync_core::sync::{
    DatabaseBackend, JsonFileSource, MemorySink, RowSource, SyncConfig, SyncError, SyncExecutor,
    SyncReport, TableSink,
};

/// Arguments for the `sync` command
#[derive(Default)]
pub struct SyncArgs {
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Endpoint returning `{sheet name: [row, ...]}`
    pub source_url: Option<String>,
    /// Read sheets from a local JSON file instead of the endpoint
    pub input: Option<PathBuf>,
    /// PostgreSQL connection string
    pub database_url: Option<String>,
    /// Write to this DuckDB file instead of PostgreSQL
    pub duckdb: Option<PathBuf>,
    /// Plan tables without writing anything
    pub dry_run: bool,
    /// Skip the PostgREST schema reload notification
    pub no_notify: bool,
    /// Type for columns with no values
    pub empty_columns: Option<SqlType>,
    /// Output format (table, json)
    pub format: String,
}

/// Build the effective configuration: file, then environment, then flags
pub fn resolve_config(args: &SyncArgs) -> Result<SyncConfig, CliError> {
    resolve_config_with(args, |key| std::env::var(key).ok())
}

/// [`resolve_config`] with an arbitrary environment lookup
///
/// Environment values only fill in urls. Only an explicit `--database-url`
/// or `--duckdb` changes the backend.
pub fn resolve_config_with<F>(args: &SyncArgs, lookup: F) -> Result<SyncConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::default(),
    };
    config.apply_env_from(lookup);

    if let Some(url) = &args.source_url {
        config = config.with_source_url(url.clone());
    }
    if let Some(url) = &args.database_url {
        config = config.with_postgres(url.clone());
    }
    if let Some(path) = &args.duckdb {
        config = config.with_duckdb(path.clone());
    }
    if args.dry_run {
        config = config.with_dry_run(true);
    }
    if args.no_notify {
        config = config.with_notify_schema_reload(false);
    }
    if let Some(sql_type) = args.empty_columns {
        config.inference.empty_column_type = sql_type;
    }

    if args.input.is_none() {
        config.validate_source().map_err(SyncError::InvalidConfig)?;
    }
    if !config.dry_run {
        config
            .validate_database()
            .map_err(SyncError::InvalidConfig)?;
    }

    Ok(config)
}

/// Handle the `sync` command
pub async fn handle_sync(args: &SyncArgs) -> Result<SyncReport, CliError> {
    let format = args.format.to_lowercase();
    if !matches!(format.as_str(), "table" | "json") {
        return Err(CliError::InvalidArgument(format!(
            "Unknown format '{}'. Use table or json.",
            args.format
        )));
    }

    let config = resolve_config(args)?;
    tracing::debug!(
        backend = %config.database.backend,
        dry_run = config.dry_run,
        notify = config.notify_schema_reload,
        "Resolved configuration"
    );
    let source = build_source(args, &config)?;
    let mut sink = build_sink(&config).await?;

    eprintln!("Syncing from {}", source.describe());
    if config.dry_run {
        eprintln!("  Dry run: no tables will be written");
    } else {
        eprintln!("  Backend: {}", config.database.backend);
    }

    let report = SyncExecutor::new(config)
        .run(source.as_ref(), sink.as_mut())
        .await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", format_report(&report)),
    }

    Ok(report)
}

fn build_source(args: &SyncArgs, config: &SyncConfig) -> Result<Box<dyn RowSource>, CliError> {
    if let Some(path) = &args.input {
        return Ok(Box::new(JsonFileSource::new(path.clone())));
    }

    #[cfg(feature = "http-source")]
    {
        let url = config.source.url.clone().unwrap_or_default();
        Ok(Box::new(
            sheetsync_core::sync::HttpSource::new(url).with_timeout(config.source.timeout_seconds),
        ))
    }

    #[cfg(not(feature = "http-source"))]
    {
        let _ = config;
        Err(CliError::FeatureNotAvailable(
            "Fetching from a URL (use --input)".to_string(),
        ))
    }
}

async fn build_sink(config: &SyncConfig) -> Result<Box<dyn TableSink>, CliError> {
    if config.dry_run {
        return Ok(Box::new(MemorySink::new()));
    }

    match config.database.backend {
        DatabaseBackend::Postgres => {
            #[cfg(feature = "postgres-backend")]
            {
                let url = config.database.url.clone().unwrap_or_default();
                let sink = sheetsync_core::sync::PostgresSink::connect(&url)
                    .await?
                    .with_notify_schema_reload(config.notify_schema_reload);
                Ok(Box::new(sink))
            }
            #[cfg(not(feature = "postgres-backend"))]
            {
                Err(CliError::FeatureNotAvailable(
                    "The postgres backend".to_string(),
                ))
            }
        }
        DatabaseBackend::DuckDb => {
            #[cfg(feature = "duckdb-backend")]
            {
                let path = config.database.path.clone().unwrap_or_default();
                Ok(Box::new(sheetsync_core::sync::DuckDbSink::open(path)?))
            }
            #[cfg(not(feature = "duckdb-backend"))]
            {
                Err(CliError::FeatureNotAvailable(
                    "The duckdb backend".to_string(),
                ))
            }
        }
    }
}
