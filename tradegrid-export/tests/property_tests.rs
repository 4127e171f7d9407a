//! Property tests for the CSV path.
//!
//! Uses proptest to verify:
//! 1. Round trip: parsing the CSV back yields every cell value exactly
//! 2. The header line always comes first and lines never end with a newline

use proptest::prelude::*;
use serde_json::{json, Value};
use tradegrid_core::missing::is_missing;
use tradegrid_core::record::ColumnDescriptor;
use tradegrid_export::to_csv;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_cell() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,;\"'\n.-]{1,16}".prop_filter("missing values render blank", |s| !is_missing(s.as_str()))
}

fn arb_table() -> impl Strategy<Value = Vec<[String; 3]>> {
    prop::collection::vec([arb_cell(), arb_cell(), arb_cell()], 1..20)
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("company.name", "Company"),
        ColumnDescriptor::new("note", "Note, free text"),
        ColumnDescriptor::new("product", "Product \"HS\""),
    ]
}

fn rows(cells: &[[String; 3]]) -> Vec<Value> {
    cells
        .iter()
        .map(|[name, note, product]| json!({"company": {"name": name}, "note": note, "product": product}))
        .collect()
}

// ── 1. Round trip ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn csv_round_trips(cells in arb_table()) {
        let text = to_csv(&rows(&cells), &columns()).unwrap();
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        prop_assert_eq!(headers, vec!["Company", "Note, free text", "Product \"HS\""]);

        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        let expected: Vec<Vec<String>> = cells.iter().map(|row| row.to_vec()).collect();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn no_trailing_newline(cells in arb_table()) {
        let text = to_csv(&rows(&cells), &columns()).unwrap();
        prop_assert!(text.starts_with("Company,"));
        prop_assert!(!text.ends_with('\n'));
    }
}
