//! Export requests and the artifacts they produce.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tradegrid_core::config::PdfSettings;
use tradegrid_core::record::ColumnDescriptor;

use crate::delimited::write_table;
use crate::error::ExportError;
use crate::pdf::{render_pdf, ChartImage, LayoutInput};
use crate::table::TableData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv;charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }
}

/// One export invocation. Built by the caller, consumed by a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub rows: Vec<Value>,
    /// Empty means "use the first row's keys".
    pub columns: Vec<ColumnDescriptor>,
    pub format: ExportFormat,
    pub title: String,
    pub subtitle: Option<String>,
    /// Base name; the format's extension is appended.
    pub filename: String,
    pub pdf: PdfSettings,
    pub charts: Vec<ChartImage>,
    /// Timestamp printed on PDFs; `None` uses the local clock.
    pub generated_at: Option<NaiveDateTime>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, rows: Vec<Value>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            rows,
            columns,
            format,
            title: "Export".to_string(),
            subtitle: None,
            filename: "export".to_string(),
            pdf: PdfSettings::default(),
            charts: Vec::new(),
            generated_at: None,
        }
    }

    pub fn csv(rows: Vec<Value>, columns: Vec<ColumnDescriptor>) -> Self {
        Self::new(ExportFormat::Csv, rows, columns)
    }

    pub fn pdf(rows: Vec<Value>, columns: Vec<ColumnDescriptor>) -> Self {
        Self::new(ExportFormat::Pdf, rows, columns)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_pdf_settings(mut self, settings: PdfSettings) -> Self {
        self.pdf = settings;
        self
    }

    pub fn with_chart(mut self, chart: ChartImage) -> Self {
        self.charts.push(chart);
        self
    }

    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Final file name: the base name stripped of path separators, with the
    /// format's extension.
    pub fn artifact_name(&self) -> String {
        let base: String = self
            .filename
            .trim()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        let base = if base.is_empty() { "export".to_string() } else { base };
        let extension = self.format.extension();
        if base.to_lowercase().ends_with(&format!(".{extension}")) {
            base
        } else {
            format!("{base}.{extension}")
        }
    }

    /// Build the artifact. An empty row set yields `Ok(None)`.
    pub fn render(&self) -> Result<Option<Artifact>, ExportError> {
        if self.rows.is_empty() {
            return Ok(None);
        }
        let table = TableData::build(&self.rows, &self.columns);
        if table.column_count() == 0 {
            return Err(ExportError::NoColumns);
        }
        let bytes = match self.format {
            ExportFormat::Csv => write_table(&table)?.into_bytes(),
            ExportFormat::Pdf => {
                let at = self.generated_at.unwrap_or_else(|| Local::now().naive_local());
                let generated = format!("Generated: {} at {}", at.format("%Y-%m-%d"), at.format("%H:%M:%S"));
                let input = LayoutInput {
                    title: &self.title,
                    subtitle: self.subtitle.as_deref(),
                    generated: &generated,
                    table: &table,
                    charts: &self.charts,
                    settings: &self.pdf,
                };
                render_pdf(&input, at)?
            }
        };
        Ok(Some(Artifact {
            filename: self.artifact_name(),
            format: self.format,
            bytes,
        }))
    }
}

/// A finished export, ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
