//! TradeGrid Export — turn a filtered, sorted row set into a downloadable file.
//!
//! - CSV text with RFC 4180 quoting
//! - Paginated PDF tables with a title block, a repeated header row and
//!   optional chart images stacked below the table
//! - A busy flag that allows one export in flight per control and is released
//!   however the export ends
//! - Sinks standing in for the host's download mechanism

pub mod controller;
pub mod delimited;
pub mod document;
pub mod error;
pub mod guard;
pub mod pdf;
pub mod sink;
pub mod table;

pub use controller::{run_export, ExportController, ExportOutcome, ExportTask};
pub use delimited::to_csv;
pub use document::{Artifact, ExportFormat, ExportRequest};
pub use error::{ExportError, PdfError};
pub use guard::{BusyFlag, BusyGuard};
pub use pdf::{ChartImage, RasterImage};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use table::{flatten_rows, format_rows, TableData};
