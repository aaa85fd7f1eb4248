//! Row sources: where sheet data comes from

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::error::{SyncError, SyncResult};
use crate::inference::Row;
use crate::inference::value_type_name;

/// One sheet as received
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// Sheet name as received
    pub name: String,
    /// Rows, or the reason the sheet payload could not be read as rows
    pub rows: Result<Vec<Row>, String>,
}

/// All sheets from one fetch, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetBatch {
    tables: Vec<SheetTable>,
}

impl SheetBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet of rows
    pub fn push(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.tables.push(SheetTable {
            name: name.into(),
            rows: Ok(rows),
        });
    }

    /// Build a batch from `{sheet name: [row, ...]}`
    ///
    /// The top level must be an object. A sheet whose value is not an array
    /// of objects is kept as a malformed entry so the other sheets still sync.
    /// A null sheet reads as empty.
    pub fn from_value(value: Value) -> SyncResult<Self> {
        let sheets = match value {
            Value::Object(sheets) => sheets,
            other => {
                return Err(SyncError::Source(format!(
                    "expected a JSON object of sheets, found {}",
                    value_type_name(&other)
                )));
            }
        };

        let tables = sheets
            .into_iter()
            .map(|(name, rows)| SheetTable {
                rows: parse_rows(rows),
                name,
            })
            .collect();

        Ok(Self { tables })
    }

    /// Parse a batch from JSON text
    pub fn from_json_str(json: &str) -> SyncResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SyncError::Source(format!("response is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn tables(&self) -> &[SheetTable] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Rows across all well-formed sheets
    pub fn total_rows(&self) -> usize {
        self.tables
            .iter()
            .filter_map(|t| t.rows.as_ref().ok())
            .map(Vec::len)
            .sum()
    }
}

impl IntoIterator for SheetBatch {
    type Item = SheetTable;
    type IntoIter = std::vec::IntoIter<SheetTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

fn parse_rows(value: Value) -> Result<Vec<Row>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(format!("row {i}: expected an object, found {}", value_type_name(&other))),
            })
            .collect(),
        other => Err(format!("expected an array of rows, found {}", value_type_name(&other))),
    }
}

/// Trait for anything that can produce a batch of sheets
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Fetch every sheet
    async fn fetch(&self) -> SyncResult<SheetBatch>;
}

/// Reads a batch from a local JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> SyncResult<SheetBatch> {
        if !self.path.exists() {
            return Err(SyncError::FileNotFound(self.path.clone()));
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        SheetBatch::from_json_str(&content)
    }
}

/// Serves a batch already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    batch: SheetBatch,
}

impl StaticSource {
    pub fn new(batch: SheetBatch) -> Self {
        Self { batch }
    }
}

#[async_trait]
impl RowSource for StaticSource {
    fn describe(&self) -> String {
        format!("{} in-memory sheet(s)", self.batch.len())
    }

    async fn fetch(&self) -> SyncResult<SheetBatch> {
        Ok(self.batch.clone())
    }
}

/// Fetches a batch from a web endpoint (for example an Apps Script deployment)
#[cfg(feature = "http-source")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout_seconds: u64,
    client: reqwest::Client,
}

#[cfg(feature = "http-source")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: 30,
            client: reqwest::Client::new(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http-source")]
#[async_trait]
impl RowSource for HttpSource {
    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }

    async fn fetch(&self) -> SyncResult<SheetBatch> {
        tracing::debug!(url = %self.url, "Fetching sheet data");

        let response = self
            .client
            .get(&self.url)
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Http(format!(
                        "request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    SyncError::Http(format!("failed to connect to {}: {}", self.url, e))
                } else {
                    SyncError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Source(format!("HTTP {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Http(e.to_string()))?;
        SheetBatch::from_json_str(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_order() {
        let batch = SheetBatch::from_value(json!({
            "Zeta": [{"a": "1"}],
            "Alpha": [],
            "Mid": null
        }))
        .unwrap();

        let names: Vec<&str> = batch.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(batch.get("Mid").unwrap().rows, Ok(vec![]));
        assert_eq!(batch.total_rows(), 1);
    }

    #[test]
    fn test_malformed_sheet_is_isolated() {
        let batch = SheetBatch::from_value(json!({
            "Good": [{"a": "1"}],
            "Scalar": "oops",
            "Mixed": [{"a": "1"}, 3]
        }))
        .unwrap();

        assert!(batch.get("Good").unwrap().rows.is_ok());
        assert_eq!(
            batch.get("Scalar").unwrap().rows,
            Err("expected an array of rows, found string".to_string())
        );
        assert_eq!(
            batch.get("Mixed").unwrap().rows,
            Err("row 1: expected an object, found number".to_string())
        );
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            SheetBatch::from_value(json!([1, 2])),
            Err(SyncError::Source(_))
        ));
        assert!(matches!(
            SheetBatch::from_json_str("<html>"),
            Err(SyncError::Source(_))
        ));
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sheets.json");
        std::fs::write(&path, r#"{"Sheet1": [{"x": "1"}, {"x": "2"}]}"#).unwrap();

        let batch = JsonFileSource::new(&path).fetch().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.total_rows(), 2);

        let missing = JsonFileSource::new(dir.path().join("nope.json")).fetch().await;
        assert!(matches!(missing, Err(SyncError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_static_source() {
        let mut batch = SheetBatch::new();
        batch.push("t", vec![Row::new()]);
        let source = StaticSource::new(batch.clone());
        assert_eq!(source.fetch().await.unwrap(), batch);
    }
}
