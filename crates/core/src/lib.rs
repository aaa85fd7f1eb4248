//! Sheetsync Core - column type inference and full-replace table sync
//!
//! Provides:
//! - Type inference for loosely-typed sheet rows (integer, float, date,
//!   timestamp, text) with canonical date normalization
//! - Identifier sanitization for table and column names
//! - A sync pipeline that recreates one table per sheet in PostgreSQL or
//!   DuckDB, isolating failures per table

pub mod inference;
pub mod sync;
pub mod validation;

// Re-export commonly used types
pub use inference::{
    ColumnTypeResolver, ColumnTypes, InferenceConfig, InferenceError, Row, SqlType, TypeLevel,
    classify, detect_temporal, normalize_temporal, resolve_column_types, sanitize_row,
};
pub use sync::{SyncConfig, SyncError, SyncExecutor, SyncReport, TablePlan};
pub use validation::{ValidationError, sanitize_identifier};
