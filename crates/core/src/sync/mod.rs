//! Full-replace sync of sheets into database tables
//!
//! A run fetches every sheet from a [`RowSource`], builds a [`TablePlan`]
//! per sheet (resolved column types, sanitized names, normalized rows), and
//! hands each plan to a [`TableSink`] which drops, recreates and fills the
//! table. Tables are independent: one failing table is reported and the rest
//! continue.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sheetsync_core::sync::{HttpSource, PostgresSink, SyncConfig, SyncExecutor};
//!
//! let config = SyncConfig::from_file("sheetsync.toml")?;
//! let source = HttpSource::new("https://script.google.com/macros/s/.../exec");
//! let mut sink = PostgresSink::connect("postgres://localhost/app").await?;
//!
//! let report = SyncExecutor::new(config).run(&source, &mut sink).await?;
//! println!("{} tables synced", report.synced_count());
//! ```

mod config;
#[cfg(feature = "duckdb-backend")]
mod duckdb;
mod error;
mod executor;
mod plan;
#[cfg(feature = "postgres-backend")]
mod postgres;
mod sink;
mod source;

pub use config::{
    DATABASE_URL_ENV, DatabaseBackend, DatabaseConfig, PASSWORD_PLACEHOLDER, SOURCE_URL_ENV,
    SourceConfig, SyncConfig,
};
#[cfg(feature = "duckdb-backend")]
pub use duckdb::DuckDbSink;
pub use error::{SyncError, SyncResult};
pub use executor::{SyncExecutor, SyncReport, SyncStage, TableOutcome, TableReport};
pub use plan::{ColumnDef, PRIMARY_KEY_COLUMN, SqlDialect, TablePlan};
#[cfg(feature = "postgres-backend")]
pub use postgres::{PostgresSink, SCHEMA_RELOAD_SQL};
pub use sink::{MemorySink, MemoryTable, TableSink};
#[cfg(feature = "http-source")]
pub use source::HttpSource;
pub use source::{JsonFileSource, RowSource, SheetBatch, SheetTable, StaticSource};
