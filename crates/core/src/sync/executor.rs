//! Sync executor: fetch sheets, plan each table, replace it in the sink

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::config::SyncConfig;
use super::error::{SyncError, SyncResult};
use super::plan::TablePlan;
use super::sink::TableSink;
use super::source::{RowSource, SheetTable};

/// Step at which a table failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStage {
    /// Reading rows, resolving types, naming columns
    Plan,
    /// Dropping and creating the table
    Schema,
    /// Writing rows
    Insert,
}

impl SyncStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Schema => "schema",
            Self::Insert => "insert",
        }
    }
}

/// What happened to one table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Table replaced and rows written
    Synced { rows: u64 },
    /// Sheet had no rows; the table was left untouched
    Skipped { reason: String },
    /// Dry run: the plan was built but nothing was written
    Planned { columns: usize, rows: usize },
    /// Table failed; other tables were still processed
    Failed { stage: SyncStage, error: String },
}

/// Per-table entry in a [`SyncReport`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    /// Sheet name as received
    pub source_name: String,
    /// Sanitized table name
    pub table: String,
    pub outcome: TableOutcome,
    /// Present once the plan has been built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<TablePlan>,
    pub duration_ms: u64,
}

impl TableReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TableOutcome::Failed { .. })
    }
}

/// Result of one sync run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

impl SyncReport {
    pub fn synced_count(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Synced { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Skipped { .. }))
    }

    pub fn planned_count(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Planned { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Failed { .. }))
    }

    /// Rows written across all synced tables
    pub fn rows_written(&self) -> u64 {
        self.tables
            .iter()
            .map(|t| match t.outcome {
                TableOutcome::Synced { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    /// True when no table failed
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| t.is_failed())
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables
            .iter()
            .find(|t| t.table == name || t.source_name == name)
    }

    fn count(&self, pred: impl Fn(&TableOutcome) -> bool) -> usize {
        self.tables.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// Sync executor that replaces one table per sheet
pub struct SyncExecutor {
    config: SyncConfig,
}

impl SyncExecutor {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run a sync
    ///
    /// Only a failed fetch aborts the run. Each table is planned, created and
    /// filled independently; a failure is recorded in the report and the
    /// remaining tables are still processed.
    pub async fn run(
        &self,
        source: &dyn RowSource,
        sink: &mut dyn TableSink,
    ) -> SyncResult<SyncReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "sync_run",
            run_id = %run_id,
            backend = sink.backend(),
            dry_run = self.config.dry_run
        );

        self.run_inner(run_id, source, sink).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: String,
        source: &dyn RowSource,
        sink: &mut dyn TableSink,
    ) -> SyncResult<SyncReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(source = %source.describe(), "Fetching sheet data");
        let batch = source.fetch().await.inspect_err(|e| {
            error!(error = %e, "Fetch failed");
        })?;
        info!(
            sheets = batch.len(),
            rows = batch.total_rows(),
            "Fetched sheet data"
        );

        let mut tables = Vec::with_capacity(batch.len());
        for sheet in batch {
            let span = info_span!("sync_table", sheet = %sheet.name);
            let report = self.sync_table(sheet, sink).instrument(span).await;
            tables.push(report);
        }

        let report = SyncReport {
            run_id,
            started_at,
            dry_run: self.config.dry_run,
            tables,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            synced = report.synced_count(),
            skipped = report.skipped_count(),
            planned = report.planned_count(),
            failed = report.failed_count(),
            rows = report.rows_written(),
            duration_ms = report.duration_ms,
            "Sync completed"
        );

        Ok(report)
    }

    async fn sync_table(&self, sheet: SheetTable, sink: &mut dyn TableSink) -> TableReport {
        let start = Instant::now();
        let SheetTable { name, rows } = sheet;
        let fallback_table = crate::validation::sanitize_identifier(&name);

        let finish = |table: String, outcome: TableOutcome, plan: Option<TablePlan>| TableReport {
            source_name: name.clone(),
            table,
            outcome,
            plan,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let rows = match rows {
            Ok(rows) => rows,
            Err(reason) => {
                let err = SyncError::InvalidTable {
                    table: name.clone(),
                    reason,
                };
                warn!(error = %err, "Skipping malformed sheet");
                return finish(fallback_table, failed(SyncStage::Plan, &err), None);
            }
        };

        if rows.is_empty() {
            info!("Skipping empty sheet");
            return finish(
                fallback_table,
                TableOutcome::Skipped {
                    reason: "sheet has no rows".to_string(),
                },
                None,
            );
        }

        let plan = match TablePlan::build(&name, &rows, &self.config.inference) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "Planning failed");
                return finish(fallback_table, failed(SyncStage::Plan, &e), None);
            }
        };
        debug!(
            table = %plan.name,
            columns = plan.columns.len(),
            rows = plan.row_count(),
            "Planned table"
        );

        if self.config.dry_run {
            let outcome = TableOutcome::Planned {
                columns: plan.columns.len(),
                rows: plan.row_count(),
            };
            return finish(plan.name.clone(), outcome, Some(plan));
        }

        if let Err(e) = sink.replace_table(&plan).await {
            error!(table = %plan.name, error = %e, "Schema creation failed");
            return finish(plan.name.clone(), failed(SyncStage::Schema, &e), Some(plan));
        }
        info!(table = %plan.name, "Table created");

        match sink.insert_rows(&plan).await {
            Ok(written) => {
                info!(table = %plan.name, rows = written, "Rows inserted");
                finish(
                    plan.name.clone(),
                    TableOutcome::Synced { rows: written },
                    Some(plan),
                )
            }
            Err(e) => {
                error!(table = %plan.name, error = %e, "Insert failed");
                finish(plan.name.clone(), failed(SyncStage::Insert, &e), Some(plan))
            }
        }
    }
}

fn failed(stage: SyncStage, err: &SyncError) -> TableOutcome {
    TableOutcome::Failed {
        stage,
        error: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::sink::MemorySink;
    use crate::sync::source::{SheetBatch, StaticSource};
    use serde_json::json;

    fn batch(value: serde_json::Value) -> SheetBatch {
        SheetBatch::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_run_syncs_every_table() {
        let source = StaticSource::new(batch(json!({
            "Orders": [{"id#": "1", "total": "9.5"}, {"id#": "2", "total": "3"}],
            "People": [{"name": "Ada"}]
        })));
        let mut sink = MemorySink::new();

        let report = SyncExecutor::new(SyncConfig::default())
            .run(&source, &mut sink)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.synced_count(), 2);
        assert_eq!(report.rows_written(), 3);
        assert_eq!(sink.table_names(), vec!["Orders", "People"]);
        assert_eq!(sink.table("Orders").unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_sheet_skipped() {
        let source = StaticSource::new(batch(json!({"Empty": [], "Also": null})));
        let mut sink = MemorySink::new();

        let report = SyncExecutor::new(SyncConfig::default())
            .run(&source, &mut sink)
            .await
            .unwrap();

        assert_eq!(report.skipped_count(), 2);
        assert!(sink.table_names().is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_sink() {
        let source = StaticSource::new(batch(json!({"T": [{"a": "1"}]})));
        let mut sink = MemorySink::new().fail_schema_for("T");

        let config = SyncConfig::default().with_dry_run(true);
        let report = SyncExecutor::new(config)
            .run(&source, &mut sink)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(
            report.tables[0].outcome,
            TableOutcome::Planned {
                columns: 1,
                rows: 1
            }
        );
        assert!(sink.statements().is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = TableOutcome::Failed {
            stage: SyncStage::Insert,
            error: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "failed", "stage": "insert", "error": "boom"})
        );
    }
}
