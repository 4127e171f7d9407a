//! Paginated PDF documents: a title block, the export table and optional
//! chart images, written with the standard Helvetica fonts.

pub mod layout;
pub mod raster;
pub mod writer;

use chrono::NaiveDateTime;

pub use layout::{lay_out, DrawOp, Font, LayoutInput, PageLayout};
pub use raster::{ChartImage, RasterImage};

use crate::error::PdfError;
use writer::{write_pdf, DocumentInfo};

/// Lay out and serialize one document.
pub fn render_pdf(input: &LayoutInput<'_>, created: NaiveDateTime) -> Result<Vec<u8>, PdfError> {
    let pages = lay_out(input)?;
    let images: Vec<&RasterImage> = input.charts.iter().map(|chart| &chart.image).collect();
    let info = DocumentInfo {
        title: input.title,
        created,
    };
    write_pdf(&pages, &images, &info, input.settings.page_size_pt())
}
