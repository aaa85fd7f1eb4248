//! Column type resolution over a batch of rows

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::classifier::{classify, scalar_text};
use super::config::InferenceConfig;
use super::error::{InferenceError, InferenceResult};
use super::types::{ColumnProfile, ColumnTypes, Row, SqlType, TypeLevel, value_type_name};

/// Statistics from a resolver run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Rows classified
    pub rows_processed: usize,
    /// Inputs skipped (malformed JSON)
    pub rows_skipped: usize,
    /// Columns taken from the first row
    pub columns_discovered: usize,
    /// Keys seen only in later rows, in order of first appearance
    pub ignored_columns: Vec<String>,
    /// Per-column observations
    pub columns: Vec<ColumnProfile>,
}

#[derive(Debug, Clone)]
struct ColumnState {
    name: String,
    max_level: TypeLevel,
    non_empty: usize,
    empty: usize,
    levels: BTreeMap<TypeLevel, usize>,
    examples: Vec<String>,
}

impl ColumnState {
    fn new(name: String) -> Self {
        Self {
            name,
            max_level: TypeLevel::Empty,
            non_empty: 0,
            empty: 0,
            levels: BTreeMap::new(),
            examples: Vec::new(),
        }
    }
}

/// Incremental column type resolver
///
/// The first row fixes the column set. Every later row raises each
/// column's level to the maximum it has seen; blank cells never raise it.
#[derive(Debug, Clone)]
pub struct ColumnTypeResolver {
    config: InferenceConfig,
    columns: Vec<ColumnState>,
    initialized: bool,
    ignored: Vec<String>,
    rows_processed: usize,
    rows_skipped: usize,
}

impl Default for ColumnTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnTypeResolver {
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            initialized: false,
            ignored: Vec::new(),
            rows_processed: 0,
            rows_skipped: 0,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Add one row
    pub fn add_row(&mut self, row: &Row) {
        if !self.initialized {
            self.columns = row.keys().cloned().map(ColumnState::new).collect();
            self.initialized = true;
        } else {
            for key in row.keys() {
                if !self.columns.iter().any(|c| c.name == *key) && !self.ignored.contains(key) {
                    tracing::debug!(column = %key, "ignoring column absent from first row");
                    self.ignored.push(key.clone());
                }
            }
        }

        let collect = self.config.collect_examples;
        let max_examples = self.config.max_examples;
        for column in &mut self.columns {
            let value = row.get(&column.name);
            let level = classify(value);
            *column.levels.entry(level).or_insert(0) += 1;

            if level == TypeLevel::Empty {
                column.empty += 1;
                continue;
            }

            column.non_empty += 1;
            column.max_level = column.max_level.max(level);

            if collect && column.examples.len() < max_examples {
                if let Some(text) = value.and_then(scalar_text) {
                    let text = text.trim();
                    if !column.examples.iter().any(|e| e == text) {
                        column.examples.push(text.to_string());
                    }
                }
            }
        }

        self.rows_processed += 1;
    }

    /// Add a parsed JSON value; it must be an object
    pub fn add_value(&mut self, value: &Value) -> InferenceResult<()> {
        match value {
            Value::Object(row) => {
                self.add_row(row);
                Ok(())
            }
            other => Err(InferenceError::InvalidStructure(
                value_type_name(other).to_string(),
            )),
        }
    }

    /// Add a JSON document holding one row
    ///
    /// Malformed JSON is counted as skipped rather than failing the batch.
    pub fn add_json(&mut self, json: &str) -> InferenceResult<()> {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => self.add_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed row");
                self.rows_skipped += 1;
                Ok(())
            }
        }
    }

    /// Add every row of a slice
    pub fn add_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a Row>) {
        for row in rows {
            self.add_row(row);
        }
    }

    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            rows_processed: self.rows_processed,
            rows_skipped: self.rows_skipped,
            columns_discovered: self.columns.len(),
            ignored_columns: self.ignored.clone(),
            columns: self.profiles(),
        }
    }

    /// Resolved column types in discovery order
    pub fn finalize(&self) -> ColumnTypes {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), self.resolve(c)))
            .collect()
    }

    /// Per-column profiles in discovery order
    pub fn profiles(&self) -> Vec<ColumnProfile> {
        self.columns
            .iter()
            .map(|c| ColumnProfile {
                name: c.name.clone(),
                sql_type: self.resolve(c),
                max_level: c.max_level,
                non_empty: c.non_empty,
                empty: c.empty,
                levels: c.levels.clone(),
                examples: c.examples.clone(),
            })
            .collect()
    }

    fn resolve(&self, column: &ColumnState) -> SqlType {
        column
            .max_level
            .sql_type()
            .unwrap_or(self.config.empty_column_type)
    }
}

/// Resolve column types for a batch with the default configuration
pub fn resolve_column_types(rows: &[Row]) -> ColumnTypes {
    resolve_column_types_with(rows, &InferenceConfig::default())
}

/// Resolve column types for a batch with an explicit configuration
pub fn resolve_column_types_with(rows: &[Row], config: &InferenceConfig) -> ColumnTypes {
    let mut resolver = ColumnTypeResolver::with_config(config.clone());
    resolver.add_rows(rows);
    resolver.finalize()
}
