//! Table sinks: where planned tables are written

use std::collections::HashSet;

use async_trait::async_trait;

use super::error::{SyncError, SyncResult};
use super::plan::{SqlDialect, TablePlan};

/// Trait for database backends that can replace a table wholesale
///
/// `replace_table` is always called before `insert_rows` for the same plan.
#[async_trait]
pub trait TableSink: Send {
    /// Backend name for logs
    fn backend(&self) -> &'static str;

    /// Dialect used to render this sink's statements
    fn dialect(&self) -> SqlDialect;

    /// Drop the table if it exists and create it from the plan
    async fn replace_table(&mut self, plan: &TablePlan) -> SyncResult<()>;

    /// Insert all planned rows, returning how many were written
    async fn insert_rows(&mut self, plan: &TablePlan) -> SyncResult<u64>;
}

/// A table held by [`MemorySink`]
#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub plan: TablePlan,
    /// Bound parameters of every inserted row
    pub rows: Vec<Vec<Option<String>>>,
}

/// In-memory sink that records what would be written
///
/// Tables can be configured to fail at either stage, which makes it useful
/// for exercising partial-failure handling.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Vec<MemoryTable>,
    statements: Vec<String>,
    fail_schema: HashSet<String>,
    fail_insert: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject schema creation for a (sanitized) table name
    pub fn fail_schema_for(mut self, table: impl Into<String>) -> Self {
        self.fail_schema.insert(table.into());
        self
    }

    /// Reject inserts for a (sanitized) table name
    pub fn fail_insert_for(mut self, table: impl Into<String>) -> Self {
        self.fail_insert.insert(table.into());
        self
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.iter().find(|t| t.plan.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.plan.name.as_str()).collect()
    }

    /// Every statement rendered so far, in order
    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

#[async_trait]
impl TableSink for MemorySink {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn replace_table(&mut self, plan: &TablePlan) -> SyncResult<()> {
        if self.fail_schema.contains(&plan.name) {
            return Err(SyncError::Database(format!(
                "schema creation rejected for table \"{}\"",
                plan.name
            )));
        }

        self.statements
            .push(plan.replace_table_sql(self.dialect()));
        self.tables.retain(|t| t.plan.name != plan.name);
        self.tables.push(MemoryTable {
            plan: plan.clone(),
            rows: Vec::new(),
        });
        Ok(())
    }

    async fn insert_rows(&mut self, plan: &TablePlan) -> SyncResult<u64> {
        if self.fail_insert.contains(&plan.name) {
            return Err(SyncError::Database(format!(
                "insert rejected for table \"{}\"",
                plan.name
            )));
        }

        let sql = plan.insert_sql(self.dialect());
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.plan.name == plan.name)
            .ok_or_else(|| {
                SyncError::Database(format!("relation \"{}\" does not exist", plan.name))
            })?;

        table.rows.extend(plan.bound_rows());
        self.statements.push(sql);
        Ok(plan.row_count() as u64)
    }
}
