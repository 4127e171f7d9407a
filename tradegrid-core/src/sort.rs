//! Declarative, stable sorting.
//!
//! A [`SortSpec`] names a field and a direction, usually encoded as
//! `"<field>_<direction>"` (`"volume_desc"`). The [`SortRegistry`] maps field
//! names to a path and a comparison kind; unknown fields compare as
//! case-insensitive text at the path equal to their name.
//!
//! Missing values (see [`crate::missing`]) and values that cannot be read as
//! the field's kind always sort after every present value, in both directions.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::missing::is_missing;
use crate::record::{parse_datetime, parse_number, plain_text, resolve_path};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortSpecError {
    #[error("empty sort spec")]
    Empty,
    #[error("sort spec '{0}' has no direction suffix (expected '<field>_asc' or '<field>_desc')")]
    MissingDirection(String),
    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = SortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(SortSpecError::UnknownDirection(other.to_string())),
        }
    }
}

/// Field + direction. Serializes as its `"field_direction"` string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl FromStr for SortSpec {
    type Err = SortSpecError;

    /// Splits on the last underscore, so fields may themselves contain
    /// underscores (`"total_value_desc"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SortSpecError::Empty);
        }
        let (field, direction) = s
            .rsplit_once('_')
            .ok_or_else(|| SortSpecError::MissingDirection(s.to_string()))?;
        if field.is_empty() {
            return Err(SortSpecError::Empty);
        }
        Ok(Self::new(field, direction.parse()?))
    }
}

impl TryFrom<String> for SortSpec {
    type Error = SortSpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortSpec> for String {
    fn from(spec: SortSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction.as_str())
    }
}

// ─── Registry ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    /// Case-insensitive string comparison.
    Text,
    /// Numeric comparison on safely parsed values.
    Numeric,
    /// Timestamp comparison on parsed dates.
    Date,
}

/// Where a sortable field lives in a row and how it compares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortField {
    pub path: String,
    pub kind: SortKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRegistry {
    fields: BTreeMap<String, SortField>,
}

impl SortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields of normalized trade rows (see [`crate::aggregate::TradeRow`]).
    pub fn standard() -> Self {
        Self::new()
            .register("name", "name", SortKind::Text)
            .register("country", "country", SortKind::Text)
            .register("segment", "segment", SortKind::Text)
            .register("volume", "volume", SortKind::Numeric)
            .register("revenue", "total_value", SortKind::Numeric)
            .register("value", "total_value", SortKind::Numeric)
            .register("price", "avg_price", SortKind::Numeric)
            .register("growth", "yoy_growth", SortKind::Numeric)
            .register("transactions", "transaction_count", SortKind::Numeric)
            .register("date", "first_trade", SortKind::Date)
    }

    pub fn register(mut self, name: impl Into<String>, path: impl Into<String>, kind: SortKind) -> Self {
        self.fields.insert(
            name.into(),
            SortField {
                path: path.into(),
                kind,
            },
        );
        self
    }

    /// Strategy for `name`; unknown names fall back to text at path `name`.
    pub fn lookup(&self, name: &str) -> SortField {
        self.fields.get(name).cloned().unwrap_or_else(|| SortField {
            path: name.to_string(),
            kind: SortKind::Text,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

// ─── Comparator ─────────────────────────────────────────────────────

/// A pre-extracted sort key. `Missing` is ordered last by [`Comparator`].
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Missing,
    Text(String),
    Number(f64),
    Timestamp(i64),
}

impl SortKey {
    fn cmp_present(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    field: SortField,
    direction: SortDirection,
}

impl Comparator {
    pub fn new(spec: &SortSpec, registry: &SortRegistry) -> Self {
        Self {
            field: registry.lookup(&spec.field),
            direction: spec.direction,
        }
    }

    pub fn key(&self, row: &Value) -> SortKey {
        let value = match resolve_path(row, &self.field.path) {
            Some(v) if !is_missing(v) => v,
            _ => return SortKey::Missing,
        };
        match self.field.kind {
            SortKind::Text => SortKey::Text(plain_text(value).to_lowercase()),
            SortKind::Numeric => parse_number(value).map_or(SortKey::Missing, SortKey::Number),
            SortKind::Date => parse_datetime(value).map_or(SortKey::Missing, |dt| {
                SortKey::Timestamp(dt.and_utc().timestamp_millis())
            }),
        }
    }

    /// Total order on keys: present keys by direction, missing keys last.
    pub fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            (a, b) => self.direction.apply(a.cmp_present(b)),
        }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        self.compare_keys(&self.key(a), &self.key(b))
    }
}

/// Stable in-place sort. Keys are extracted once per row.
pub fn sort_rows(rows: &mut Vec<Value>, spec: &SortSpec, registry: &SortRegistry) {
    let comparator = Comparator::new(spec, registry);
    let mut keyed: Vec<(SortKey, Value)> = rows
        .drain(..)
        .map(|row| (comparator.key(&row), row))
        .collect();
    // slice::sort_by is stable: equal keys keep input order.
    keyed.sort_by(|a, b| comparator.compare_keys(&a.0, &b.0));
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}

/// Sorted copy of `rows`.
pub fn sorted(rows: &[Value], spec: &SortSpec, registry: &SortRegistry) -> Vec<Value> {
    let mut out = rows.to_vec();
    sort_rows(&mut out, spec, registry);
    out
}
