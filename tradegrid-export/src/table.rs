//! Header and cell text shared by the CSV and PDF exporters.
//!
//! Both paths go through [`TableData::build`], so a column renders the same
//! text in either format.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tradegrid_core::format::Formatter;
use tradegrid_core::record::{columns_from_first_row, is_record, plain_text, resolve_path, ColumnDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Resolve every column against every record. Non-record rows are skipped.
    /// With no descriptors the first record's keys become the columns.
    pub fn build(rows: &[Value], columns: &[ColumnDescriptor]) -> Self {
        let derived;
        let columns = if columns.is_empty() {
            derived = columns_from_first_row(rows);
            derived.as_slice()
        } else {
            columns
        };

        let headers = columns.iter().map(|c| c.header().to_string()).collect();
        let body = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                if !is_record(row) {
                    tracing::debug!(index, "skipping non-record row in export");
                    return None;
                }
                Some(columns.iter().map(|c| c.cell_text(row)).collect())
            })
            .collect();
        Self {
            headers,
            rows: body,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Copy nested values up to flat keys: each `(flat_key, nested_path)` pair
/// sets `row[flat_key] = row.<nested_path>`, `null` when unresolvable.
pub fn flatten_rows(rows: &[Value], mappings: &[(&str, &str)]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let Some(map) = row.as_object() else {
                return row.clone();
            };
            let mut flat = map.clone();
            for (flat_key, path) in mappings {
                let value = resolve_path(row, path).cloned().unwrap_or(Value::Null);
                flat.insert(flat_key.to_string(), value);
            }
            Value::Object(flat)
        })
        .collect()
}

/// Pre-render values for export: keys with a formatter are formatted (missing
/// becomes `null`), nested objects collapse to their `name` or compact JSON,
/// everything else is kept as-is.
pub fn format_rows(rows: &[Value], formatters: &BTreeMap<String, Formatter>) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let Some(map) = row.as_object() else {
                return row.clone();
            };
            let formatted: Map<String, Value> = map
                .iter()
                .map(|(key, value)| {
                    let out = match (formatters.get(key), value) {
                        (Some(formatter), _) => formatter.format(value).map_or(Value::Null, Value::String),
                        (None, Value::Object(_)) => Value::String(plain_text(value)),
                        (None, _) => value.clone(),
                    };
                    (key.clone(), out)
                })
                .collect();
            Value::Object(formatted)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_fall_back_to_keys() {
        let table = TableData::build(
            &[json!({"company": {"name": "Acme"}, "volume": 5})],
            &[
                ColumnDescriptor::new("company.name", "Company"),
                ColumnDescriptor::new("volume", ""),
            ],
        );
        assert_eq!(table.headers, vec!["Company", "volume"]);
        assert_eq!(table.rows, vec![vec!["Acme", "5"]]);
    }

    #[test]
    fn broken_paths_render_empty() {
        let table = TableData::build(
            &[json!({"company": null}), json!({"company": {"address": null}})],
            &[ColumnDescriptor::new("company.address.city", "City")],
        );
        assert_eq!(table.rows, vec![vec![""], vec![""]]);
    }

    #[test]
    fn columns_default_to_first_row_keys() {
        let table = TableData::build(&[json!("junk"), json!({"b": 2, "a": 1})], &[]);
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn formatters_apply_to_cells() {
        let table = TableData::build(
            &[json!({"value": 1234567, "growth": null})],
            &[
                ColumnDescriptor::new("value", "Value").with_formatter(Formatter::Currency),
                ColumnDescriptor::new("growth", "Growth").with_formatter(Formatter::Percent),
            ],
        );
        assert_eq!(table.rows[0], vec!["$1,234,567", ""]);
    }

    #[test]
    fn flatten_copies_nested_values() {
        let rows = flatten_rows(
            &[json!({"buyer": {"name": "Acme", "country": "PK"}})],
            &[("buyer_name", "buyer.name"), ("seller_name", "seller.name")],
        );
        assert_eq!(rows[0]["buyer_name"], json!("Acme"));
        assert_eq!(rows[0]["seller_name"], Value::Null);
        assert_eq!(rows[0]["buyer"]["country"], json!("PK"));
    }

    #[test]
    fn format_rows_collapses_objects() {
        let mut formatters = BTreeMap::new();
        formatters.insert("price".to_string(), Formatter::Currency);
        let rows = format_rows(
            &[json!({
                "price": 12.4,
                "product": {"name": "Rice"},
                "meta": {"hs": 1006},
                "note": "N/A",
            })],
            &formatters,
        );
        assert_eq!(rows[0]["price"], json!("$12"));
        assert_eq!(rows[0]["product"], json!("Rice"));
        assert_eq!(rows[0]["meta"], json!("{\"hs\":1006}"));
        assert_eq!(rows[0]["note"], json!("N/A"));
    }
}
