//! Column formatters shared by every output path.
//!
//! A formatter is a tag, not a closure, so the CSV and PDF exporters (and the
//! on-screen table) apply exactly the same rule to a cell.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::missing::is_missing;
use crate::record::{parse_datetime, parse_number, plain_text};

/// Fallback shown on screen for a missing value.
pub const DEFAULT_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formatter {
    /// Value as-is.
    #[default]
    Plain,
    /// USD, en-US grouping, no decimals: `$1,234,567`.
    Currency,
    /// Signed, two decimals: `+12.50%`.
    Percent,
    /// en-US grouping, up to three decimals, metric tons: `1,250.5 MT`.
    Volume,
    /// Calendar date: `2024-03-15`.
    Date,
    /// en-US grouping with a fixed number of decimals.
    Number { decimals: u8 },
}

impl Formatter {
    /// Format a cell value. Missing values yield `None`.
    ///
    /// Values that do not fit the formatter (a non-numeric string under
    /// `Currency`, an unparsable date under `Date`) fall through as plain
    /// text rather than being dropped.
    pub fn format(&self, value: &Value) -> Option<String> {
        if is_missing(value) {
            return None;
        }
        let text = match self {
            Self::Plain => plain_text(value),
            Self::Currency => match parse_number(value) {
                Some(n) => format_currency(n),
                None => plain_text(value),
            },
            Self::Percent => match parse_number(value) {
                Some(n) => format_percent(n),
                None => plain_text(value),
            },
            Self::Volume => match parse_number(value) {
                Some(n) => format_volume(n),
                None => plain_text(value),
            },
            Self::Date => match parse_datetime(value) {
                Some(dt) => dt.format("%Y-%m-%d").to_string(),
                None => plain_text(value),
            },
            Self::Number { decimals } => match parse_number(value) {
                Some(n) => format_grouped(n, *decimals as usize, false),
                None => plain_text(value),
            },
        };
        Some(text)
    }
}

/// Format a value, or `None` when it is missing.
pub fn format_or_none(value: Option<&Value>, formatter: Formatter) -> Option<String> {
    value.and_then(|v| formatter.format(v))
}

/// Render a value for display, substituting `fallback` for missing values.
pub fn display_value(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(v) if !is_missing(v) => plain_text(v),
        _ => fallback.to_string(),
    }
}

pub fn format_currency(n: f64) -> String {
    let rounded = n.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_digits(&format!("{:.0}", rounded.abs())))
}

pub fn format_percent(n: f64) -> String {
    // -0.0 must print as +0.00%
    let n = if n == 0.0 { 0.0 } else { n };
    let sign = if n >= 0.0 { "+" } else { "" };
    format!("{sign}{n:.2}%")
}

pub fn format_volume(n: f64) -> String {
    format!("{} MT", format_grouped(n, 3, true))
}

/// en-US thousands grouping with `decimals` fractional digits. With
/// `trim_zeros`, trailing fractional zeros (and a bare point) are dropped.
pub fn format_grouped(n: f64, decimals: usize, trim_zeros: bool) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (fixed.clone(), String::new()),
    };
    let frac = if trim_zeros {
        frac_part.trim_end_matches('0').to_string()
    } else {
        frac_part
    };
    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{}", group_digits(&int_part))
    } else {
        format!("{sign}{}.{frac}", group_digits(&int_part))
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
