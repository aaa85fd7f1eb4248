//! Type levels, SQL column types and the row model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One row of a sheet: column name to raw scalar, in source order
pub type Row = serde_json::Map<String, Value>;

/// Rank of a single value in the type hierarchy
///
/// Variants are declared in rank order so the derived `Ord` matches the
/// hierarchy: `Empty < Integer < Float < Date < Timestamp < Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeLevel {
    /// Value carries no type information (null, missing, blank)
    Empty,
    /// Whole number
    Integer,
    /// Number with a fractional part
    Float,
    /// Calendar date
    Date,
    /// Date with a time of day
    Timestamp,
    /// Anything else
    Text,
}

impl TypeLevel {
    /// Numeric rank, `-1` for `Empty` and `0..=4` for the typed levels
    pub fn rank(self) -> i8 {
        match self {
            TypeLevel::Empty => -1,
            TypeLevel::Integer => 0,
            TypeLevel::Float => 1,
            TypeLevel::Date => 2,
            TypeLevel::Timestamp => 3,
            TypeLevel::Text => 4,
        }
    }

    /// Inverse of [`TypeLevel::rank`]
    pub fn from_rank(rank: i8) -> Option<Self> {
        match rank {
            -1 => Some(TypeLevel::Empty),
            0 => Some(TypeLevel::Integer),
            1 => Some(TypeLevel::Float),
            2 => Some(TypeLevel::Date),
            3 => Some(TypeLevel::Timestamp),
            4 => Some(TypeLevel::Text),
            _ => None,
        }
    }

    /// SQL type for this level, `None` for `Empty`
    pub fn sql_type(self) -> Option<SqlType> {
        match self {
            TypeLevel::Empty => None,
            TypeLevel::Integer => Some(SqlType::Integer),
            TypeLevel::Float => Some(SqlType::Float),
            TypeLevel::Date => Some(SqlType::Date),
            TypeLevel::Timestamp => Some(SqlType::Timestamp),
            TypeLevel::Text => Some(SqlType::Text),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeLevel::Empty => "empty",
            TypeLevel::Integer => "integer",
            TypeLevel::Float => "float",
            TypeLevel::Date => "date",
            TypeLevel::Timestamp => "timestamp",
            TypeLevel::Text => "text",
        }
    }
}

impl fmt::Display for TypeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Integer,
    Float,
    Date,
    Timestamp,
    Text,
}

impl SqlType {
    /// All column types in hierarchy order
    pub const ALL: [SqlType; 5] = [
        SqlType::Integer,
        SqlType::Float,
        SqlType::Date,
        SqlType::Timestamp,
        SqlType::Text,
    ];

    /// The type level this column type corresponds to
    pub fn level(self) -> TypeLevel {
        match self {
            SqlType::Integer => TypeLevel::Integer,
            SqlType::Float => TypeLevel::Float,
            SqlType::Date => TypeLevel::Date,
            SqlType::Timestamp => TypeLevel::Timestamp,
            SqlType::Text => TypeLevel::Text,
        }
    }

    /// Canonical upper-case name
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Float => "FLOAT",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text => "TEXT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" | "bigint" => Ok(SqlType::Integer),
            "float" | "float8" | "double" | "double precision" => Ok(SqlType::Float),
            "date" => Ok(SqlType::Date),
            "timestamp" | "datetime" => Ok(SqlType::Timestamp),
            "text" | "varchar" | "string" => Ok(SqlType::Text),
            other => Err(format!(
                "Unknown column type '{other}'. Valid values: integer, float, date, timestamp, text"
            )),
        }
    }
}

/// Kind of temporal value recognised in text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalKind {
    Date,
    Timestamp,
}

impl TemporalKind {
    pub fn level(self) -> TypeLevel {
        match self {
            TemporalKind::Date => TypeLevel::Date,
            TemporalKind::Timestamp => TypeLevel::Timestamp,
        }
    }
}

/// Ordered mapping from column name to resolved type
///
/// Iteration order is column discovery order (the first row's key order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    columns: Vec<(String, SqlType)>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; an existing entry with the same name is overwritten in place
    pub fn insert(&mut self, name: impl Into<String>, sql_type: SqlType) {
        let name = name.into();
        if let Some(entry) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = sql_type;
        } else {
            self.columns.push((name, sql_type));
        }
    }

    pub fn get(&self, name: &str) -> Option<SqlType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SqlType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), *t))
    }
}

impl IntoIterator for ColumnTypes {
    type Item = (String, SqlType);
    type IntoIter = std::vec::IntoIter<(String, SqlType)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl FromIterator<(String, SqlType)> for ColumnTypes {
    fn from_iter<I: IntoIterator<Item = (String, SqlType)>>(iter: I) -> Self {
        let mut types = ColumnTypes::new();
        for (name, sql_type) in iter {
            types.insert(name, sql_type);
        }
        types
    }
}

impl Serialize for ColumnTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, sql_type) in &self.columns {
            map.serialize_entry(name, sql_type)?;
        }
        map.end()
    }
}

/// Per-column observations gathered while resolving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    /// Column name as it appeared in the first row
    pub name: String,
    /// Resolved column type
    pub sql_type: SqlType,
    /// Highest level seen in a non-empty cell (`Empty` if none)
    pub max_level: TypeLevel,
    /// Cells that contributed a type level
    pub non_empty: usize,
    /// Blank, null or missing cells
    pub empty: usize,
    /// Number of cells per observed level
    pub levels: BTreeMap<TypeLevel, usize>,
    /// Distinct sample values
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl ColumnProfile {
    /// True when no cell in the column carried a value
    pub fn is_all_empty(&self) -> bool {
        self.non_empty == 0
    }
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
