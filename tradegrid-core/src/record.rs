//! Rows and column descriptors.
//!
//! A row is an opaque `serde_json::Value` object as delivered by the HTTP
//! layer. Nothing here validates a schema: lookups that hit a missing key, a
//! `null` intermediate, or a non-object value simply resolve to `None`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::Formatter;

/// A single displayed record (company, transaction, watchlist entry, ...).
pub type Row = Value;

// ─── Path resolution ────────────────────────────────────────────────

/// Resolve a dot-path (`"company.name"`) against a row.
///
/// Segments are descended in order. Descent stops at the first missing,
/// `null` or scalar intermediate. Numeric segments index into arrays. Only
/// when descent finds nothing is a literal key containing the dots tried, so
/// rows that were flattened for export (`{"company.name": "Acme"}`) still
/// resolve.
pub fn resolve_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    descend(row, path).or_else(|| row.as_object().and_then(|map| map.get(path)))
}

fn descend<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = row;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `true` when the row is usable as a keyed record.
pub fn is_record(row: &Value) -> bool {
    row.is_object()
}

// ─── Value coercion ─────────────────────────────────────────────────

/// Safe numeric parse: numbers pass through, numeric strings are parsed
/// (thousands separators, surrounding whitespace and a trailing `%` are
/// tolerated). Anything else, and any non-finite result, is `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('%')
                .chars()
                .filter(|c| *c != ',' && *c != '_')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse a date-like value into a `NaiveDateTime`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// plain dates and year-month strings (`2024-03` → March 1st). Numbers are
/// read as Unix epoch milliseconds.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        Value::String(s) => parse_datetime_str(s.trim()),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Render a number the way a browser would print it: integral values carry
/// no fractional part, everything else uses the shortest round-trip form.
pub fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Plain text rendering used by exports and case-insensitive sorting.
///
/// `null` is empty, arrays are joined with `", "`, and objects render as their
/// `name` field when present or as compact JSON otherwise.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => number_text(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(plain_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => value.to_string(),
        },
    }
}

// ─── Row identity ───────────────────────────────────────────────────

/// An `id`-like field: either numeric or textual. Uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl RowId {
    /// Read a row id from a JSON value. Missing ids and non-scalar values are `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Number(i)),
                None => Some(Self::Text(n.to_string())),
            },
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Key form used for lookups in persisted collections.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ─── Column descriptors ─────────────────────────────────────────────

/// Maps a (possibly nested) field path to a display label and formatter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub formatter: Formatter,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            formatter: Formatter::Plain,
        }
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Header text: the label, or the key when the label is blank.
    pub fn header(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Resolve and format this column's cell for a row.
    ///
    /// Unresolvable paths and values the formatter treats as missing render
    /// as an empty string.
    pub fn cell_text(&self, row: &Value) -> String {
        resolve_path(row, &self.key)
            .and_then(|value| self.formatter.format(value))
            .unwrap_or_default()
    }
}

/// Derive plain columns from the keys of the first record, in key order.
pub fn columns_from_first_row(rows: &[Value]) -> Vec<ColumnDescriptor> {
    rows.iter()
        .find_map(Value::as_object)
        .map(|map| {
            map.keys()
                .map(|key| ColumnDescriptor::new(key.clone(), String::new()))
                .collect()
        })
        .unwrap_or_default()
}
