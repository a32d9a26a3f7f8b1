//! Typed field values used for filtering, searching and sorting

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// The comparison semantics of a sortable or range-filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Compared lexicographically
    Text,
    /// Calendar date, compared chronologically
    Date,
    /// Timestamp, compared chronologically
    DateTime,
    /// Compared by numeric value
    Integer,
}

/// A polymorphic field value read from a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Integer(i64),
    Null,
}

impl FieldValue {
    /// Get the value as a string if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Parse a raw query string as a value of the given kind
    ///
    /// Date-times also accept a plain `YYYY-MM-DD`, read as midnight UTC.
    pub fn parse(kind: FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
            FieldKind::DateTime => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                })
                .map(FieldValue::DateTime),
            FieldKind::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
        }
    }

    /// Exact-match comparison against a filter value
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            FieldValue::Text(s) => s == expected,
            FieldValue::Null => false,
            other => other.to_filter_string() == expected,
        }
    }

    /// Render the value the way it appears in a filter or query string
    pub fn to_filter_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Null => String::new(),
        }
    }

    /// Typed ordering between two values
    ///
    /// Values of the same kind compare naturally. Null sorts before everything
    /// else, and mismatched kinds fall back to a fixed kind rank so the
    /// ordering stays total.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Integer(_) => 1,
            FieldValue::Date(_) => 2,
            FieldValue::DateTime(_) => 3,
            FieldValue::Text(_) => 4,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(FieldValue::Date).unwrap_or(FieldValue::Null)
    }
}
