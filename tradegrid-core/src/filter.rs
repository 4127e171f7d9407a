//! Row filtering: missing-data policies and AND-composed field predicates.
//!
//! Every screen that hides incomplete rows must name its policy:
//! [`MissingPolicy::RequireAny`] keeps a row when at least one required field
//! has a value, [`MissingPolicy::RequireAll`] keeps it only when all of them
//! do. Non-object rows are dropped by every filter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::missing::is_missing;
use crate::record::{is_record, parse_number, plain_text, resolve_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Drop a row only when every required field is missing.
    #[default]
    RequireAny,
    /// Drop a row when any required field is missing.
    RequireAll,
}

impl MissingPolicy {
    /// Whether `row` survives this policy for `fields`. An empty field list keeps everything.
    pub fn keeps<S: AsRef<str>>(&self, row: &Value, fields: &[S]) -> bool {
        if fields.is_empty() {
            return true;
        }
        let present = |field: &S| !is_missing(&resolve_path(row, field.as_ref()));
        match self {
            Self::RequireAny => fields.iter().any(present),
            Self::RequireAll => fields.iter().all(present),
        }
    }
}

/// Keep rows where at least one of `required` is not missing.
pub fn hide_incomplete<S: AsRef<str>>(rows: &[Value], required: &[S]) -> Vec<Value> {
    retain_complete(rows, required, MissingPolicy::RequireAny)
}

/// Keep rows that satisfy `policy` for `required`.
pub fn retain_complete<S: AsRef<str>>(
    rows: &[Value],
    required: &[S],
    policy: MissingPolicy,
) -> Vec<Value> {
    rows.iter()
        .filter(|row| is_record(row) && policy.keeps(row, required))
        .cloned()
        .collect()
}

// ─── Field predicates ───────────────────────────────────────────────

/// A declarative, serializable row predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldPredicate {
    /// Case-insensitive text equality (numbers compare by their text form).
    Equals { path: String, value: Value },
    /// Case-insensitive substring match.
    Contains { path: String, needle: String },
    /// Inclusive numeric range; an open bound is unbounded.
    Range {
        path: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// The field holds a value.
    Present { path: String },
    /// Missing-data policy over several fields.
    Complete {
        fields: Vec<String>,
        policy: MissingPolicy,
    },
}

impl FieldPredicate {
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::Equals { path, value } => match resolve_path(row, path) {
                Some(actual) if !is_missing(actual) => {
                    plain_text(actual).to_lowercase() == plain_text(value).to_lowercase()
                }
                _ => false,
            },
            Self::Contains { path, needle } => {
                let needle = needle.trim().to_lowercase();
                if needle.is_empty() {
                    return true;
                }
                resolve_path(row, path)
                    .filter(|v| !is_missing(*v))
                    .map_or(false, |v| plain_text(v).to_lowercase().contains(&needle))
            }
            Self::Range { path, min, max } => {
                match resolve_path(row, path).and_then(parse_number) {
                    Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
                    None => false,
                }
            }
            Self::Present { path } => !is_missing(&resolve_path(row, path)),
            Self::Complete { fields, policy } => policy.keeps(row, fields),
        }
    }
}

/// An AND-composition of predicates evaluated as one combined pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    predicates: Vec<FieldPredicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate (builder style).
    pub fn and(mut self, predicate: FieldPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: FieldPredicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[FieldPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True when the row is a record and satisfies every predicate.
    pub fn matches(&self, row: &Value) -> bool {
        is_record(row) && self.predicates.iter().all(|p| p.matches(row))
    }

    /// Single pass over `rows`.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Filter with an ad-hoc closure in addition to a `FilterSet`, still in one pass.
pub fn apply_with<F>(rows: &[Value], filters: &FilterSet, extra: F) -> Vec<Value>
where
    F: Fn(&Value) -> bool,
{
    rows.iter()
        .filter(|row| filters.matches(row) && extra(row))
        .cloned()
        .collect()
}
