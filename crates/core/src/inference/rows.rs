//! Row sanitization: identifier-safe keys, explicit nulls, canonical dates

use serde_json::Value;

use super::classifier::is_blank;
use super::formats::{detect_temporal, normalize_temporal};
use super::types::Row;
use crate::validation::sanitize_identifier;

/// A row ready for insertion, keyed by sanitized column name
pub type CleanRow = serde_json::Map<String, Value>;

/// Sanitize one cell
///
/// Blank cells become null. Text that reads as a date or timestamp is
/// rewritten to its canonical form. Everything else passes through.
pub fn sanitize_value(value: &Value) -> Value {
    if is_blank(Some(value)) {
        return Value::Null;
    }

    match value {
        Value::String(text) => match detect_temporal(text) {
            Some(kind) => Value::String(normalize_temporal(text, kind)),
            None => value.clone(),
        },
        // The text form of a number or boolean never reads as a date
        other => other.clone(),
    }
}

/// Sanitize one row; empty keys are dropped
///
/// When two keys sanitize to the same name the later value wins.
pub fn sanitize_row(row: &Row) -> CleanRow {
    let mut clean = CleanRow::new();
    for (key, value) in row {
        if key.is_empty() {
            continue;
        }
        clean.insert(sanitize_identifier(key), sanitize_value(value));
    }
    clean
}

pub fn sanitize_rows(rows: &[Row]) -> Vec<CleanRow> {
    rows.iter().map(sanitize_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_blank_becomes_null() {
        assert_eq!(sanitize_value(&json!("")), Value::Null);
        assert_eq!(sanitize_value(&json!("  ")), Value::Null);
        assert_eq!(sanitize_value(&Value::Null), Value::Null);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(sanitize_value(&json!(5)), json!(5));
        assert_eq!(sanitize_value(&json!(2.5)), json!(2.5));
        assert_eq!(sanitize_value(&json!("5.5")), json!("5.5"));
        assert_eq!(sanitize_value(&json!(true)), json!(true));
    }

    #[test]
    fn test_dates_are_normalized() {
        assert_eq!(sanitize_value(&json!("15/01/2024")), json!("2024-01-15"));
        assert_eq!(
            sanitize_value(&json!("2024-01-15 10:30:00")),
            json!("2024-01-15T10:30:00")
        );
        assert_eq!(
            sanitize_value(&json!(" 2024-01-15T10:30:00Z ")),
            json!("2024-01-15T10:30:00Z")
        );
    }

    #[test]
    fn test_text_is_untouched() {
        assert_eq!(sanitize_value(&json!(" hello ")), json!(" hello "));
    }

    #[test]
    fn test_sanitize_row_keys() {
        let clean = sanitize_row(&row(json!({
            "Order #1": "x",
            "": "dropped",
            "Due Date": "01/02/2024",
            "Notes": ""
        })));

        let keys: Vec<&str> = clean.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Order__1", "Due_Date", "Notes"]);
        assert_eq!(clean["Due_Date"], json!("2024-02-01"));
        assert_eq!(clean["Notes"], Value::Null);
    }

    #[test]
    fn test_canonical_rows_unchanged() {
        let input = row(json!({"a": "5", "b": "2024-01-01"}));
        let clean = sanitize_row(&input);
        assert_eq!(clean, input);
        assert_eq!(sanitize_row(&clean), clean);
    }
}
