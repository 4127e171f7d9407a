//! CSV rendering.
//!
//! Header line first, one line per record, `\n` between lines and none after
//! the last. Fields containing a comma, a double quote or a line break are
//! quoted with inner quotes doubled. Missing values are written as empty
//! fields without quotes, except when a record consists of a single empty
//! field: that one is written as `""` so the line still reads back as a
//! record rather than a blank line.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use tradegrid_core::record::ColumnDescriptor;

use crate::error::ExportError;
use crate::table::TableData;

/// Render `rows` as CSV text. An empty row set renders as an empty string.
pub fn to_csv(rows: &[Value], columns: &[ColumnDescriptor]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Ok(String::new());
    }
    write_table(&TableData::build(rows, columns))
}

pub fn write_table(table: &TableData) -> Result<String, ExportError> {
    if table.column_count() == 0 {
        return Err(ExportError::NoColumns);
    }
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(data)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
