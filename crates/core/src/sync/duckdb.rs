//! DuckDB table sink

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::error::{SyncError, SyncResult};
use super::plan::{SqlDialect, TablePlan};
use super::sink::TableSink;
use crate::validation::quote_identifier;

/// Embedded DuckDB database, file-backed or in-memory
pub struct DuckDbSink {
    conn: duckdb::Connection,
    path: Option<PathBuf>,
}

impl DuckDbSink {
    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let conn = duckdb::Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn memory() -> SyncResult<Self> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Database path, if not in-memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of rows currently in a table
    pub fn row_count(&self, table: &str) -> SyncResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Execute a query and return results as JSON objects
    ///
    /// Dates and timestamps come back in their canonical text form.
    pub fn query(&self, sql: &str) -> SyncResult<Vec<serde_json::Value>> {
        use duckdb::types::{TimeUnit, Value as DbValue};
        use serde_json::Value;

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut obj = serde_json::Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value: DbValue = row.get(i)?;
                let json_value = match value {
                    DbValue::Null => Value::Null,
                    DbValue::Boolean(b) => Value::Bool(b),
                    DbValue::TinyInt(n) => Value::Number(n.into()),
                    DbValue::SmallInt(n) => Value::Number(n.into()),
                    DbValue::Int(n) => Value::Number(n.into()),
                    DbValue::BigInt(n) => Value::Number(n.into()),
                    DbValue::Float(f) => serde_json::Number::from_f64(f as f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    DbValue::Double(f) => serde_json::Number::from_f64(f)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    DbValue::Text(s) => Value::String(s),
                    DbValue::Date32(days) => chrono::NaiveDate::from_num_days_from_ce_opt(
                        days + UNIX_EPOCH_DAYS_FROM_CE,
                    )
                    .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                    .unwrap_or(Value::Null),
                    DbValue::Timestamp(unit, raw) => {
                        let micros = match unit {
                            TimeUnit::Second => raw * 1_000_000,
                            TimeUnit::Millisecond => raw * 1_000,
                            TimeUnit::Microsecond => raw,
                            TimeUnit::Nanosecond => raw / 1_000,
                        };
                        chrono::DateTime::from_timestamp_micros(micros)
                            .map(|dt| {
                                Value::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string())
                            })
                            .unwrap_or(Value::Null)
                    }
                    other => Value::String(format!("{other:?}")),
                };
                obj.insert(name.clone(), json_value);
            }
            results.push(Value::Object(obj));
        }

        Ok(results)
    }
}

// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[async_trait]
impl TableSink for DuckDbSink {
    fn backend(&self) -> &'static str {
        "duckdb"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::DuckDb
    }

    async fn replace_table(&mut self, plan: &TablePlan) -> SyncResult<()> {
        // DuckDB folds identifier case, even when quoted
        if let Some(column) = plan.case_folded_conflict() {
            return Err(SyncError::DuplicateColumn {
                table: plan.name.clone(),
                column: column.name.clone(),
            });
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(&plan.replace_table_sql(SqlDialect::DuckDb))?;
        tx.commit()?;
        Ok(())
    }

    async fn insert_rows(&mut self, plan: &TablePlan) -> SyncResult<u64> {
        let sql = plan.insert_sql(SqlDialect::DuckDb);
        let tx = self.conn.transaction()?;
        let mut written = 0u64;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (index, params) in plan.bound_rows().enumerate() {
                let changed = stmt
                    .execute(duckdb::params_from_iter(params.iter()))
                    .map_err(|e| SyncError::Database(format!("row {}: {e}", index + 1)))?;
                written += changed as u64;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}
