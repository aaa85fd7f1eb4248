//! PostgreSQL table sink

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

use super::error::{SyncError, SyncResult};
use super::plan::{SqlDialect, TablePlan};
use super::sink::TableSink;

/// Statement asking PostgREST to reload its schema cache
pub const SCHEMA_RELOAD_SQL: &str = "NOTIFY pgrst, 'reload schema';";

/// PostgreSQL database (async)
pub struct PostgresSink {
    client: Client,
    notify_schema_reload: bool,
}

impl PostgresSink {
    /// Connect to a PostgreSQL database
    pub async fn connect(connection_string: &str) -> SyncResult<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(SyncError::database)?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self {
            client,
            notify_schema_reload: true,
        })
    }

    /// Enable or disable the PostgREST reload notification after each DDL
    pub fn with_notify_schema_reload(mut self, notify: bool) -> Self {
        self.notify_schema_reload = notify;
        self
    }

    /// Number of rows currently in a table
    pub async fn row_count(&self, table: &str) -> SyncResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            crate::validation::quote_identifier(table)
        );
        let row = self.client.query_one(&sql, &[]).await?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn replace_table(&mut self, plan: &TablePlan) -> SyncResult<()> {
        let tx = self.client.transaction().await?;
        tx.batch_execute(&plan.replace_table_sql(SqlDialect::Postgres))
            .await?;
        tx.commit().await?;

        if self.notify_schema_reload {
            tracing::debug!(table = %plan.name, "Requesting schema reload");
            self.client.batch_execute(SCHEMA_RELOAD_SQL).await?;
        }
        Ok(())
    }

    async fn insert_rows(&mut self, plan: &TablePlan) -> SyncResult<u64> {
        let tx = self.client.transaction().await?;
        let stmt = tx.prepare(&plan.insert_sql(SqlDialect::Postgres)).await?;

        let mut written = 0u64;
        for (index, values) in plan.bound_rows().enumerate() {
            let params: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            written += tx
                .execute(&stmt, &params)
                .await
                .map_err(|e| SyncError::Database(format!("row {}: {e}", index + 1)))?;
        }

        tx.commit().await?;
        Ok(written)
    }
}
