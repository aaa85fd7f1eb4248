//! Date and timestamp detection for text values
//!
//! Detection runs in three passes:
//!
//! 1. An ISO 8601 calendar-date pattern with an optional time-of-day,
//!    fractional seconds and offset.
//! 2. A fixed, ordered list of date-only patterns.
//! 3. A fixed, ordered list of date-time patterns.
//!
//! Within each list the first pattern that parses wins. `DD/MM/YYYY` is
//! listed before `MM/DD/YYYY`, so `03/04/2024` is read as 3 April even though
//! it also parses as 4 March.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::TemporalKind;

/// Canonical rendering for dates
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical rendering for timestamps (seconds precision, no offset)
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static ISO_TEMPORAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}([ T]\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("ISO temporal pattern is valid")
});

// chrono accepts one to four digit years and skips leading whitespace before
// numeric fields; fallback patterns only apply to text with a four digit year.
static PATTERN_SHAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{4})((\s+|[Tt])\d{1,2}:\d{1,2}(:\d{1,2})?)?$")
        .expect("fallback shape pattern is valid")
});

/// A single strptime-style grammar tried against trimmed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalPattern {
    /// Human-readable label, e.g. `DD/MM/YYYY`
    pub label: &'static str,
    /// chrono format string
    pub format: &'static str,
    /// What a successful parse means
    pub kind: TemporalKind,
}

impl TemporalPattern {
    const fn date(label: &'static str, format: &'static str) -> Self {
        Self {
            label,
            format,
            kind: TemporalKind::Date,
        }
    }

    const fn datetime(label: &'static str, format: &'static str) -> Self {
        Self {
            label,
            format,
            kind: TemporalKind::Timestamp,
        }
    }

    /// Parse `text` with this pattern and render it canonically
    ///
    /// Returns `None` when the text does not match the pattern exactly.
    /// Whitespace runs match a single space, the `T` separator matches in
    /// either case, and a leap second (`:60`) is rejected.
    pub fn parse_canonical(&self, text: &str) -> Option<String> {
        let text = loosen_separators(text);
        match self.kind {
            TemporalKind::Date => NaiveDate::parse_from_str(&text, self.format)
                .ok()
                .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string()),
            TemporalKind::Timestamp => NaiveDateTime::parse_from_str(&text, self.format)
                .ok()
                .filter(|dt| dt.nanosecond() < 1_000_000_000)
                .map(|dt| dt.format(CANONICAL_TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// True when `text` parses under this pattern
    pub fn matches(&self, text: &str) -> bool {
        self.parse_canonical(text).is_some()
    }
}

fn loosen_separators(text: &str) -> Cow<'_, str> {
    if !text.contains(char::is_whitespace) && !text.contains('t') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replacen('t', "T", 1),
    )
}

/// Date-only patterns, in the order they are tried
pub const DATE_PATTERNS: &[TemporalPattern] = &[
    TemporalPattern::date("YYYY-MM-DD", "%Y-%m-%d"),
    TemporalPattern::date("DD/MM/YYYY", "%d/%m/%Y"),
    TemporalPattern::date("MM/DD/YYYY", "%m/%d/%Y"),
];

/// Date-time patterns, in the order they are tried
pub const DATETIME_PATTERNS: &[TemporalPattern] = &[
    TemporalPattern::datetime("YYYY-MM-DD HH:MM:SS", "%Y-%m-%d %H:%M:%S"),
    TemporalPattern::datetime("YYYY-MM-DDTHH:MM:SS", "%Y-%m-%dT%H:%M:%S"),
    TemporalPattern::datetime("YYYY-MM-DD HH:MM", "%Y-%m-%d %H:%M"),
    TemporalPattern::datetime("DD/MM/YYYY HH:MM:SS", "%d/%m/%Y %H:%M:%S"),
    TemporalPattern::datetime("MM/DD/YYYY HH:MM:SS", "%m/%d/%Y %H:%M:%S"),
    TemporalPattern::datetime("DD/MM/YYYY HH:MM", "%d/%m/%Y %H:%M"),
    TemporalPattern::datetime("MM/DD/YYYY HH:MM", "%m/%d/%Y %H:%M"),
];

/// Patterns that apply to a given kind
pub fn patterns_for(kind: TemporalKind) -> &'static [TemporalPattern] {
    match kind {
        TemporalKind::Date => DATE_PATTERNS,
        TemporalKind::Timestamp => DATETIME_PATTERNS,
    }
}

/// First pattern in `patterns` that accepts `text`
pub fn first_match(
    patterns: &'static [TemporalPattern],
    text: &str,
) -> Option<&'static TemporalPattern> {
    if !PATTERN_SHAPE_REGEX.is_match(text) {
        return None;
    }
    patterns.iter().find(|p| p.matches(text))
}

/// True when `text` (already trimmed) is ISO 8601 shaped
///
/// This is a shape check only: `2024-13-45` matches.
pub fn is_iso_temporal(text: &str) -> bool {
    ISO_TEMPORAL_REGEX.is_match(text)
}

/// Detect whether a text value is a date or a timestamp
pub fn detect_temporal(value: &str) -> Option<TemporalKind> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if is_iso_temporal(value) {
        // Any time component brings a 'T' separator or a colon with it
        return if value.contains('T') || value.contains(':') {
            Some(TemporalKind::Timestamp)
        } else {
            Some(TemporalKind::Date)
        };
    }

    if first_match(DATE_PATTERNS, value).is_some() {
        return Some(TemporalKind::Date);
    }

    if first_match(DATETIME_PATTERNS, value).is_some() {
        return Some(TemporalKind::Timestamp);
    }

    None
}

/// Rewrite a detected date or timestamp into its canonical storage form
///
/// ISO-shaped input keeps its precision and offset (a timestamp only has its
/// space separator replaced by `T`). Other input is re-rendered at seconds
/// precision. Text that no pattern accepts is returned unchanged.
pub fn normalize_temporal(value: &str, kind: TemporalKind) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return value.to_string();
    }

    if is_iso_temporal(trimmed) {
        return match kind {
            // `\d` also matches non-ASCII digits, so count characters
            TemporalKind::Date => trimmed.chars().take(10).collect(),
            TemporalKind::Timestamp => trimmed.replacen(' ', "T", 1),
        };
    }

    first_match(patterns_for(kind), trimmed)
        .and_then(|p| p.parse_canonical(trimmed))
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_iso_date() {
        assert_eq!(detect_temporal("2024-01-15"), Some(TemporalKind::Date));
        assert_eq!(detect_temporal("  2024-12-31 "), Some(TemporalKind::Date));
    }

    #[test]
    fn test_detect_iso_timestamp() {
        assert_eq!(
            detect_temporal("2024-01-15T10:30:00Z"),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            detect_temporal("2024-01-15T10:30:00.123+05:30"),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            detect_temporal("2024-01-15 10:30"),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            detect_temporal("2024-01-15T10:30-0800"),
            Some(TemporalKind::Timestamp)
        );
    }

    #[test]
    fn test_detect_slash_dates() {
        assert_eq!(detect_temporal("15/01/2024"), Some(TemporalKind::Date));
        assert_eq!(detect_temporal("01/15/2024"), Some(TemporalKind::Date));
        assert_eq!(detect_temporal("5/1/2024"), Some(TemporalKind::Date));
    }

    #[test]
    fn test_detect_slash_datetimes() {
        assert_eq!(
            detect_temporal("15/01/2024 10:30:00"),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            detect_temporal("01/15/2024 10:30"),
            Some(TemporalKind::Timestamp)
        );
    }

    #[test]
    fn test_detect_unpadded_iso_falls_back_to_patterns() {
        assert_eq!(detect_temporal("2024-1-5"), Some(TemporalKind::Date));
        assert_eq!(
            detect_temporal("2024-1-5 9:30"),
            Some(TemporalKind::Timestamp)
        );
    }

    #[test]
    fn test_detect_rejects_non_temporal() {
        assert_eq!(detect_temporal(""), None);
        assert_eq!(detect_temporal("   "), None);
        assert_eq!(detect_temporal("hello"), None);
        assert_eq!(detect_temporal("31/31/2024"), None);
        assert_eq!(detect_temporal("10:30:00"), None);
        assert_eq!(detect_temporal("2024-01-15T"), None);
        // Short years are not dates
        assert_eq!(detect_temporal("1/2/3"), None);
        assert_eq!(detect_temporal("1/2/24"), None);
    }

    #[test]
    fn test_iso_shape_is_not_validated() {
        assert_eq!(detect_temporal("2024-13-45"), Some(TemporalKind::Date));
    }

    #[test]
    fn test_day_first_wins_when_both_parse() {
        // Both DD/MM and MM/DD accept this; DD/MM is tried first
        assert_eq!(
            normalize_temporal("03/04/2024", TemporalKind::Date),
            "2024-04-03"
        );
        // Only MM/DD accepts this one
        assert_eq!(
            normalize_temporal("12/25/2024", TemporalKind::Date),
            "2024-12-25"
        );
    }

    #[test]
    fn test_normalize_iso_date_truncates() {
        assert_eq!(
            normalize_temporal("2024-01-15", TemporalKind::Date),
            "2024-01-15"
        );
        assert_eq!(
            normalize_temporal("2024-01-15T10:30:00Z", TemporalKind::Date),
            "2024-01-15"
        );
    }

    #[test]
    fn test_normalize_iso_timestamp_keeps_offset_and_fraction() {
        assert_eq!(
            normalize_temporal("2024-01-15 10:30:00.250+02:00", TemporalKind::Timestamp),
            "2024-01-15T10:30:00.250+02:00"
        );
        assert_eq!(
            normalize_temporal("2024-01-15T10:30", TemporalKind::Timestamp),
            "2024-01-15T10:30"
        );
    }

    #[test]
    fn test_normalize_pattern_timestamp_to_seconds() {
        assert_eq!(
            normalize_temporal("15/01/2024 10:30", TemporalKind::Timestamp),
            "2024-01-15T10:30:00"
        );
        assert_eq!(
            normalize_temporal("2024-1-5 9:03:07", TemporalKind::Timestamp),
            "2024-01-05T09:03:07"
        );
    }

    #[test]
    fn test_normalize_unmatched_returns_input() {
        assert_eq!(
            normalize_temporal("not a date", TemporalKind::Date),
            "not a date"
        );
        // A date string asked to normalize as a timestamp matches no datetime pattern
        assert_eq!(
            normalize_temporal("15/01/2024", TemporalKind::Timestamp),
            "15/01/2024"
        );
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_values() {
        for (value, kind) in [
            ("2024-01-15", TemporalKind::Date),
            ("2024-01-15T10:30:00", TemporalKind::Timestamp),
            ("2024-01-15T10:30:00Z", TemporalKind::Timestamp),
            ("15/01/2024", TemporalKind::Date),
            ("01/15/2024 08:00", TemporalKind::Timestamp),
        ] {
            let once = normalize_temporal(value, kind);
            let twice = normalize_temporal(&once, kind);
            assert_eq!(once, twice, "normalizing {value} twice changed it");
        }
    }

    #[test]
    fn test_normalize_non_ascii_digits() {
        assert_eq!(detect_temporal("２０２４-01-15"), Some(TemporalKind::Date));
        assert_eq!(
            normalize_temporal("２０２４-01-15", TemporalKind::Date),
            "２０２４-01-15"
        );
        assert_eq!(
            normalize_temporal("２０２４-01-15T10:00:00", TemporalKind::Date),
            "２０２４-01-15"
        );
    }

    #[test]
    fn test_leap_second_is_not_a_timestamp() {
        assert_eq!(detect_temporal("15/01/2024 10:30:60"), None);
        assert_eq!(
            normalize_temporal("15/01/2024 10:30:60", TemporalKind::Timestamp),
            "15/01/2024 10:30:60"
        );
    }

    #[test]
    fn test_loose_separators() {
        assert_eq!(
            detect_temporal("15/01/2024  10:30"),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            normalize_temporal("15/01/2024  10:30", TemporalKind::Timestamp),
            "2024-01-15T10:30:00"
        );
        assert_eq!(
            normalize_temporal("2024-01-15t10:30:00", TemporalKind::Timestamp),
            "2024-01-15T10:30:00"
        );
    }

    #[test]
    fn test_pattern_lists_order() {
        let labels: Vec<&str> = DATE_PATTERNS.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["YYYY-MM-DD", "DD/MM/YYYY", "MM/DD/YYYY"]);
        assert_eq!(DATETIME_PATTERNS.len(), 7);
        assert!(DATETIME_PATTERNS
            .iter()
            .all(|p| p.kind == TemporalKind::Timestamp));
    }

    #[test]
    fn test_first_match_reports_pattern() {
        let pattern = first_match(DATE_PATTERNS, "12/25/2024").unwrap();
        assert_eq!(pattern.label, "MM/DD/YYYY");
        assert!(first_match(DATETIME_PATTERNS, "12/25/2024").is_none());
    }
}
