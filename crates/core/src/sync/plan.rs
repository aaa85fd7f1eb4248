//! Table plans: resolved columns, DDL and insert statements for one sheet

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::error::{SyncError, SyncResult};
use crate::inference::{
    CleanRow, ColumnProfile, ColumnTypeResolver, InferenceConfig, Row, SqlType, sanitize_rows,
    scalar_text,
};
use crate::validation::{quote_identifier, sanitize_identifier, validate_identifier};

/// Name of the generated primary key column
pub const PRIMARY_KEY_COLUMN: &str = "id";

/// SQL dialect used to render statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Postgres,
    DuckDb,
}

impl SqlDialect {
    /// Column type name in this dialect
    pub fn type_name(&self, sql_type: SqlType) -> &'static str {
        match (self, sql_type) {
            (_, SqlType::Integer) => "BIGINT",
            (Self::Postgres, SqlType::Float) => "FLOAT8",
            (Self::DuckDb, SqlType::Float) => "DOUBLE",
            (_, SqlType::Date) => "DATE",
            (_, SqlType::Timestamp) => "TIMESTAMP",
            (Self::Postgres, SqlType::Text) => "TEXT",
            (Self::DuckDb, SqlType::Text) => "VARCHAR",
        }
    }

    /// Placeholder for the n-th (1-based) bound text parameter, cast to `sql_type`
    ///
    /// Integers go through an exact decimal first so `"5.0"` and `"1e3"` load.
    pub fn cast_placeholder(&self, index: usize, sql_type: SqlType) -> String {
        match self {
            Self::Postgres => match sql_type {
                SqlType::Integer => format!("${index}::text::numeric::bigint"),
                SqlType::Float => format!("${index}::text::float8"),
                SqlType::Date => format!("${index}::text::date"),
                SqlType::Timestamp => format!("${index}::text::timestamp"),
                SqlType::Text => format!("${index}::text"),
            },
            Self::DuckDb => match sql_type {
                SqlType::Integer => "CAST(CAST(? AS DECIMAL(38, 9)) AS BIGINT)".to_string(),
                other => format!("CAST(? AS {})", self.type_name(other)),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::DuckDb => "duckdb",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One resolved table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Header as it appeared in the sheet
    pub source: String,
    /// Sanitized column name
    pub name: String,
    pub sql_type: SqlType,
}

/// Everything needed to replace one table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePlan {
    /// Sheet name as received
    pub source_name: String,
    /// Sanitized table name
    pub name: String,
    /// Columns in discovery order, excluding the generated key
    pub columns: Vec<ColumnDef>,
    /// Sanitized rows
    #[serde(skip)]
    pub rows: Vec<CleanRow>,
    /// Per-column observations from type resolution
    pub profiles: Vec<ColumnProfile>,
    /// Headers that appeared only after the first row
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_columns: Vec<String>,
}

impl TablePlan {
    /// Resolve column types and sanitize rows for one sheet
    ///
    /// Empty headers are dropped. Two headers that sanitize to the same name
    /// are rejected, and so is a header named exactly `id`. Names differing
    /// only in case are allowed here; see [`TablePlan::case_folded_conflict`].
    pub fn build(source_name: &str, rows: &[Row], config: &InferenceConfig) -> SyncResult<Self> {
        let name = sanitize_identifier(source_name);
        validate_identifier("table name", &name)?;

        let mut resolver = ColumnTypeResolver::with_config(config.clone());
        resolver.add_rows(rows);
        let stats = resolver.stats();

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(PRIMARY_KEY_COLUMN.to_string());

        let mut columns = Vec::new();
        let mut profiles = Vec::new();
        for profile in stats.columns {
            if profile.name.is_empty() {
                tracing::debug!(table = %name, "dropping column with empty header");
                continue;
            }

            let column_name = sanitize_identifier(&profile.name);
            validate_identifier("column name", &column_name)?;
            if !seen.insert(column_name.clone()) {
                return Err(SyncError::DuplicateColumn {
                    table: name,
                    column: column_name,
                });
            }

            columns.push(ColumnDef {
                source: profile.name.clone(),
                name: column_name,
                sql_type: profile.sql_type,
            });
            profiles.push(profile);
        }

        Ok(Self {
            source_name: source_name.to_string(),
            name,
            columns,
            rows: sanitize_rows(rows),
            profiles,
            ignored_columns: stats.ignored_columns,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First column whose name clashes with an earlier one (or with `id`)
    /// once case is folded
    ///
    /// PostgreSQL keeps quoted identifiers case-sensitive, DuckDB does not.
    pub fn case_folded_conflict(&self) -> Option<&ColumnDef> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(PRIMARY_KEY_COLUMN.to_string());
        self.columns
            .iter()
            .find(|c| !seen.insert(c.name.to_lowercase()))
    }

    fn sequence_name(&self) -> String {
        format!("seq_{}_{}", self.name, PRIMARY_KEY_COLUMN)
    }

    /// Statement(s) removing any previous version of the table
    pub fn drop_table_sql(&self, dialect: SqlDialect) -> String {
        let table = quote_identifier(&self.name);
        match dialect {
            SqlDialect::Postgres => format!("DROP TABLE IF EXISTS {table};"),
            SqlDialect::DuckDb => format!(
                "DROP TABLE IF EXISTS {table};\nDROP SEQUENCE IF EXISTS {};",
                quote_identifier(&self.sequence_name())
            ),
        }
    }

    /// Statement(s) creating the table with its generated key
    pub fn create_table_sql(&self, dialect: SqlDialect) -> String {
        let (prelude, key) = match dialect {
            SqlDialect::Postgres => (
                String::new(),
                format!("{PRIMARY_KEY_COLUMN} BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"),
            ),
            SqlDialect::DuckDb => {
                let sequence = self.sequence_name();
                (
                    format!("CREATE SEQUENCE {};\n", quote_identifier(&sequence)),
                    format!(
                        "{PRIMARY_KEY_COLUMN} BIGINT PRIMARY KEY DEFAULT nextval('{sequence}')"
                    ),
                )
            }
        };

        let mut lines = vec![format!("    {key}")];
        lines.extend(self.columns.iter().map(|c| {
            format!(
                "    {} {}",
                quote_identifier(&c.name),
                dialect.type_name(c.sql_type)
            )
        }));

        format!(
            "{prelude}CREATE TABLE {} (\n{}\n);",
            quote_identifier(&self.name),
            lines.join(",\n")
        )
    }

    /// Drop followed by create, as one script
    pub fn replace_table_sql(&self, dialect: SqlDialect) -> String {
        format!(
            "{}\n{}",
            self.drop_table_sql(dialect),
            self.create_table_sql(dialect)
        )
    }

    /// Parameterized insert for one row; parameters follow [`TablePlan::columns`]
    pub fn insert_sql(&self, dialect: SqlDialect) -> String {
        let table = quote_identifier(&self.name);
        if self.columns.is_empty() {
            return format!("INSERT INTO {table} DEFAULT VALUES");
        }

        let names: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect();
        let values: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| dialect.cast_placeholder(i + 1, c.sql_type))
            .collect();

        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            names.join(", "),
            values.join(", ")
        )
    }

    /// Text parameters for one row, aligned with the columns
    pub fn bind_row(&self, row: &CleanRow) -> Vec<Option<String>> {
        self.columns
            .iter()
            .map(|c| {
                row.get(&c.name)
                    .and_then(scalar_text)
                    .map(|text| text.into_owned())
            })
            .collect()
    }

    /// Text parameters for every row
    pub fn bound_rows(&self) -> impl Iterator<Item = Vec<Option<String>>> + '_ {
        self.rows.iter().map(|row| self.bind_row(row))
    }
}
