//! Column type inference for loosely-typed sheet rows
//!
//! Every cell is ranked in the hierarchy
//! `INTEGER < FLOAT < DATE < TIMESTAMP < TEXT`, and each column resolves to
//! the highest rank seen in any non-empty cell. Blank cells never raise a
//! column's type. The same date and timestamp detection also rewrites
//! temporal text into a canonical form before insertion.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use sheetsync_core::inference::{ColumnTypeResolver, SqlType};
//!
//! let mut resolver = ColumnTypeResolver::new();
//! resolver.add_value(&json!({"a": "5", "b": "2024-01-01"})).unwrap();
//! resolver.add_value(&json!({"a": "5.5", "b": "2024-01-01T10:00:00"})).unwrap();
//!
//! let types = resolver.finalize();
//! assert_eq!(types.get("a"), Some(SqlType::Float));
//! assert_eq!(types.get("b"), Some(SqlType::Timestamp));
//! ```

mod classifier;
mod config;
mod error;
mod formats;
mod resolver;
mod rows;
mod types;

pub use classifier::{classify, classify_str, is_blank, scalar_text};
pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use error::{InferenceError, InferenceResult};
pub use formats::{
    CANONICAL_DATE_FORMAT, CANONICAL_TIMESTAMP_FORMAT, DATE_PATTERNS, DATETIME_PATTERNS,
    TemporalPattern, detect_temporal, is_iso_temporal, normalize_temporal,
};
pub use resolver::{
    ColumnTypeResolver, InferenceStats, resolve_column_types, resolve_column_types_with,
};
pub use rows::{CleanRow, sanitize_row, sanitize_rows, sanitize_value};
pub use types::{ColumnProfile, ColumnTypes, Row, SqlType, TemporalKind, TypeLevel};
pub(crate) use types::value_type_name;
