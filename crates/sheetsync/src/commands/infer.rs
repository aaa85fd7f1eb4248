//! CLI command for previewing inferred table schemas

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::CliError;
use crate::output::format_plan;
use sheetsync_core::inference::{InferenceConfig, SqlType};
use sheetsync_core::sync::{DatabaseBackend, SheetBatch, SyncError, TablePlan};
use sheetsync_core::validation::sanitize_identifier;

/// Arguments for the `infer` command
pub struct InferArgs {
    /// JSON file holding `{sheet name: [row, ...]}`
    pub input: PathBuf,
    /// Only show this sheet (source or sanitized name)
    pub table: Option<String>,
    /// Output format (table, json, yaml, sql)
    pub format: String,
    /// Dialect for `sql` output
    pub dialect: DatabaseBackend,
    /// Type for columns with no values
    pub empty_columns: Option<SqlType>,
}

/// A sheet that could not be planned
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanFailure {
    source_name: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct InferOutput<'a> {
    tables: &'a [TablePlan],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<PlanFailure>,
}

/// Handle the `infer` command
pub fn handle_infer(args: &InferArgs) -> Result<(), CliError> {
    let format = args.format.to_lowercase();
    if !matches!(format.as_str(), "table" | "json" | "yaml" | "sql") {
        return Err(CliError::InvalidArgument(format!(
            "Unknown format '{}'. Use table, json, yaml or sql.",
            args.format
        )));
    }

    if !args.input.exists() {
        return Err(SyncError::FileNotFound(args.input.clone()).into());
    }
    let content = std::fs::read_to_string(&args.input)?;
    let batch = SheetBatch::from_json_str(&content)?;

    let mut config = InferenceConfig::default();
    if let Some(sql_type) = args.empty_columns {
        config.empty_column_type = sql_type;
    }

    let mut plans = Vec::new();
    let mut failures = Vec::new();
    let mut matched = false;

    for sheet in batch {
        if let Some(wanted) = &args.table
            && sheet.name != *wanted
            && sanitize_identifier(&sheet.name) != *wanted
        {
            continue;
        }
        matched = true;

        let rows = match sheet.rows {
            Ok(rows) => rows,
            Err(reason) => {
                warn!(sheet = %sheet.name, reason = %reason, "Malformed sheet");
                failures.push(PlanFailure {
                    source_name: sheet.name,
                    error: reason,
                });
                continue;
            }
        };

        if rows.is_empty() {
            info!(sheet = %sheet.name, "Skipping empty sheet");
            continue;
        }

        match TablePlan::build(&sheet.name, &rows, &config) {
            Ok(plan) => plans.push(plan),
            Err(e) => {
                error!(sheet = %sheet.name, error = %e, "Planning failed");
                failures.push(PlanFailure {
                    source_name: sheet.name,
                    error: e.to_string(),
                });
            }
        }
    }

    if let Some(wanted) = &args.table
        && !matched
    {
        return Err(CliError::InvalidArgument(format!(
            "No sheet named '{wanted}' in {}",
            args.input.display()
        )));
    }

    let failed = failures.len();
    let total = plans.len() + failed;

    match format.as_str() {
        "json" => {
            let output = InferOutput {
                tables: &plans,
                failures,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "yaml" => {
            let output = InferOutput {
                tables: &plans,
                failures,
            };
            print!("{}", serde_yaml::to_string(&output)?);
        }
        "sql" => {
            let dialect = args.dialect.dialect();
            for plan in &plans {
                println!("-- {} ({})", plan.source_name, dialect);
                println!("{}\n", plan.create_table_sql(dialect));
            }
        }
        _ => {
            if plans.is_empty() && failed == 0 {
                println!("No tables with rows found.");
            }
            for plan in &plans {
                println!("{}", format_plan(plan));
            }
        }
    }

    if failed > 0 {
        return Err(CliError::TablesFailed { failed, total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("sheets.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    fn args(input: PathBuf, format: &str) -> InferArgs {
        InferArgs {
            input,
            table: None,
            format: format.to_string(),
            dialect: DatabaseBackend::Postgres,
            empty_columns: None,
        }
    }

    #[test]
    fn test_infer_all_formats() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, r#"{"People": [{"name": "Ada", "age": "36"}]}"#);

        for format in ["table", "json", "yaml", "sql"] {
            handle_infer(&args(input.clone(), format)).unwrap();
        }
    }

    #[test]
    fn test_unknown_format() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "{}");
        assert!(matches!(
            handle_infer(&args(input, "csv")),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = handle_infer(&args(dir.path().join("missing.json"), "table"));
        assert!(matches!(
            result,
            Err(CliError::Sync(SyncError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_duplicate_columns_reported() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            r#"{"Bad": [{"a b": "1", "a-b": "2"}], "Good": [{"x": "1"}]}"#,
        );
        assert!(matches!(
            handle_infer(&args(input, "json")),
            Err(CliError::TablesFailed {
                failed: 1,
                total: 2
            })
        ));
    }

    #[test]
    fn test_table_filter() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, r#"{"Sales 2024": [{"x": "1"}]}"#);

        let mut by_sanitized = args(input.clone(), "table");
        by_sanitized.table = Some("Sales_2024".into());
        handle_infer(&by_sanitized).unwrap();

        let mut unknown = args(input, "table");
        unknown.table = Some("Nope".into());
        assert!(matches!(
            handle_infer(&unknown),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
