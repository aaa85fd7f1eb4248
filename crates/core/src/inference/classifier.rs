//! Classification of single cell values into type levels

use std::borrow::Cow;

use serde_json::Value;

use super::formats::detect_temporal;
use super::types::TypeLevel;

/// Render a scalar cell as the text that classification inspects
///
/// Returns `None` for null. Numbers use their JSON rendering (`5`, `5.5`),
/// booleans render as `true`/`false`, nested values as compact JSON.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// True when a cell carries no type information
pub fn is_blank(value: Option<&Value>) -> bool {
    value
        .and_then(scalar_text)
        .is_none_or(|text| text.trim().is_empty())
}

/// Classify an optional cell (missing and null are both `Empty`)
pub fn classify(value: Option<&Value>) -> TypeLevel {
    match value.and_then(scalar_text) {
        Some(text) => classify_str(&text),
        None => TypeLevel::Empty,
    }
}

/// Classify the text form of a value
///
/// Numeric forms are checked before temporal ones, so `"2024"` is an
/// integer rather than a year.
pub fn classify_str(raw: &str) -> TypeLevel {
    let text = raw.trim();
    if text.is_empty() {
        return TypeLevel::Empty;
    }

    if let Some(level) = classify_numeric(text) {
        return level;
    }

    match detect_temporal(text) {
        Some(kind) => kind.level(),
        None => TypeLevel::Text,
    }
}

fn classify_numeric(text: &str) -> Option<TypeLevel> {
    let n: f64 = text.parse().ok()?;
    // NaN and infinities never equal an integer
    if n.is_finite() && n == n.trunc() {
        Some(TypeLevel::Integer)
    } else {
        Some(TypeLevel::Float)
    }
}
