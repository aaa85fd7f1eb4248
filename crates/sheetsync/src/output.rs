//! Output formatting for CLI

use sheetsync_core::sync::{SyncReport, TableOutcome, TablePlan};

/// Render a plan as an aligned column table
pub fn format_plan(plan: &TablePlan) -> String {
    let mut out = String::new();
    if plan.name == plan.source_name {
        out.push_str(&format!("Table: {} ({} rows)\n", plan.name, plan.row_count()));
    } else {
        out.push_str(&format!(
            "Table: {} (from \"{}\", {} rows)\n",
            plan.name,
            plan.source_name,
            plan.row_count()
        ));
    }

    if plan.columns.is_empty() {
        out.push_str("  (no columns)\n");
        return out;
    }

    let rows: Vec<[String; 5]> = plan
        .columns
        .iter()
        .map(|col| {
            let profile = plan.profiles.iter().find(|p| p.name == col.source);
            let (non_empty, empty, examples) = match profile {
                Some(p) => (
                    p.non_empty.to_string(),
                    p.empty.to_string(),
                    p.examples.join(", "),
                ),
                None => ("-".to_string(), "-".to_string(), String::new()),
            };
            [
                col.name.clone(),
                col.sql_type.to_string(),
                non_empty,
                empty,
                examples,
            ]
        })
        .collect();

    let headers = ["COLUMN", "TYPE", "VALUES", "EMPTY", "EXAMPLES"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    out.push_str(&format_line(&headers.map(String::from), &widths));
    for row in &rows {
        out.push_str(&format_line(row, &widths));
    }

    if !plan.ignored_columns.is_empty() {
        out.push_str(&format!(
            "  Ignored (not in first row): {}\n",
            plan.ignored_columns.join(", ")
        ));
    }
    out
}

fn format_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let mut line = String::from(" ");
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(&format!(" {:<width$}", cell, width = width));
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

/// Render a sync report as one line per table plus a summary
pub fn format_report(report: &SyncReport) -> String {
    let mut out = String::new();
    for table in &report.tables {
        let line = match &table.outcome {
            TableOutcome::Synced { rows } => format!("  ✓ {}: {} rows", table.table, rows),
            TableOutcome::Skipped { reason } => format!("  - {}: skipped ({})", table.table, reason),
            TableOutcome::Planned { columns, rows } => {
                format!("  ~ {}: {} columns, {} rows", table.table, columns, rows)
            }
            TableOutcome::Failed { stage, error } => {
                format!("  ✗ {}: {} failed: {}", table.table, stage.name(), error)
            }
        };
        out.push_str(&line);
        out.push('\n');
    }

    let mode = if report.dry_run { " (dry run)" } else { "" };
    out.push_str(&format!(
        "\nSync {}{}: {} synced, {} skipped, {} planned, {} failed, {} rows in {}ms\n",
        report.run_id,
        mode,
        report.synced_count(),
        report.skipped_count(),
        report.planned_count(),
        report.failed_count(),
        report.rows_written(),
        report.duration_ms
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sheetsync_core::inference::{InferenceConfig, Row};
    use sheetsync_core::sync::{SyncStage, TableReport};

    fn plan(name: &str, value: serde_json::Value) -> TablePlan {
        let rows: Vec<Row> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        TablePlan::build(name, &rows, &InferenceConfig::default()).unwrap()
    }

    #[test]
    fn test_format_plan_lists_columns() {
        let plan = plan(
            "Sales 2024",
            json!([{"Order #": "1", "Note": "hi"}, {"Order #": "2", "Note": ""}]),
        );
        let text = format_plan(&plan);

        assert!(text.starts_with("Table: Sales_2024 (from \"Sales 2024\", 2 rows)"));
        assert!(text.contains("COLUMN"));
        let order = text.lines().find(|l| l.contains("Order__")).unwrap();
        assert!(order.contains("INTEGER"));
        let note = text.lines().find(|l| l.contains("Note")).unwrap();
        assert!(note.contains("TEXT"));
    }

    #[test]
    fn test_format_report_summary() {
        let report = SyncReport {
            run_id: "run-1".into(),
            started_at: Utc::now(),
            dry_run: false,
            tables: vec![
                TableReport {
                    source_name: "A".into(),
                    table: "A".into(),
                    outcome: TableOutcome::Synced { rows: 4 },
                    plan: None,
                    duration_ms: 1,
                },
                TableReport {
                    source_name: "B".into(),
                    table: "B".into(),
                    outcome: TableOutcome::Failed {
                        stage: SyncStage::Insert,
                        error: "bad date".into(),
                    },
                    plan: None,
                    duration_ms: 1,
                },
            ],
            duration_ms: 3,
        };

        let text = format_report(&report);
        assert!(text.contains("✓ A: 4 rows"));
        assert!(text.contains("✗ B: insert failed: bad date"));
        assert!(text.contains("1 synced, 0 skipped, 0 planned, 1 failed, 4 rows"));
    }
}
