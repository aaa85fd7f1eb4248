//! sheetsync - sync spreadsheet exports into freshly typed database tables

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::infer::{InferArgs, handle_infer};
use commands::sync::{SyncArgs, handle_sync};
use error::CliError;
use sheetsync_core::inference::SqlType;
use sheetsync_core::sync::DatabaseBackend;

#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(version, about = "Sync spreadsheet exports into typed database tables", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every sheet and replace one table per sheet
    Sync {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Endpoint returning {sheet name: [row, ...]} (default: $APPS_SCRIPT_URL)
        #[arg(long)]
        source_url: Option<String>,

        /// Read sheets from a local JSON file instead of the endpoint
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// PostgreSQL connection string; selects the postgres backend
        /// (default: $DATABASE_URI, backend unchanged)
        #[arg(long)]
        database_url: Option<String>,

        /// Write to a DuckDB file instead of PostgreSQL
        #[arg(long)]
        duckdb: Option<PathBuf>,

        /// Plan tables without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the PostgREST schema reload notification
        #[arg(long)]
        no_notify: bool,

        /// Type for columns with no values (integer, text, ...)
        #[arg(long)]
        empty_columns: Option<SqlType>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the table each sheet in a JSON file would become
    Infer {
        /// JSON file holding {sheet name: [row, ...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Only show this sheet
        #[arg(short, long)]
        table: Option<String>,

        /// Output format (table, json, yaml, sql)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Dialect for sql output (postgres, duckdb)
        #[arg(long, default_value = "postgres")]
        dialect: DatabaseBackend,

        /// Type for columns with no values (integer, text, ...)
        #[arg(long)]
        empty_columns: Option<SqlType>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;

    Ok(match run(cli.command, &runtime) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    })
}

fn run(command: Commands, runtime: &tokio::runtime::Runtime) -> Result<(), CliError> {
    match command {
        Commands::Sync {
            config,
            source_url,
            input,
            database_url,
            duckdb,
            dry_run,
            no_notify,
            empty_columns,
            format,
        } => {
            let args = SyncArgs {
                config,
                source_url,
                input,
                database_url,
                duckdb,
                dry_run,
                no_notify,
                empty_columns,
                format,
            };
            let report = runtime.block_on(handle_sync(&args))?;
            if !report.is_success() {
                return Err(CliError::TablesFailed {
                    failed: report.failed_count(),
                    total: report.tables.len(),
                });
            }
            Ok(())
        }
        Commands::Infer {
            input,
            table,
            format,
            dialect,
            empty_columns,
        } => handle_infer(&InferArgs {
            input,
            table,
            format,
            dialect,
            empty_columns,
        }),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sheetsync={level},sheetsync_core={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_urls_not_read_from_env_by_clap() {
        let command = Cli::command();
        let sync = command.find_subcommand("sync").unwrap();
        for id in ["database_url", "source_url"] {
            let arg = sync.get_arguments().find(|a| a.get_id() == id).unwrap();
            assert!(arg.get_env().is_none(), "{id} should come from SyncConfig::apply_env");
        }
    }

    #[test]
    fn test_parse_infer() {
        let cli = Cli::try_parse_from([
            "sheetsync",
            "infer",
            "--input",
            "sheets.json",
            "--format",
            "sql",
            "--dialect",
            "duckdb",
            "--empty-columns",
            "text",
        ])
        .unwrap();

        match cli.command {
            Commands::Infer {
                dialect,
                empty_columns,
                ..
            } => {
                assert_eq!(dialect, DatabaseBackend::DuckDb);
                assert_eq!(empty_columns, Some(SqlType::Text));
            }
            _ => panic!("expected infer"),
        }
    }
}
