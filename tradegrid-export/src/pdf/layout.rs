//! Page layout: title block, a striped table with a repeated header, stacked
//! charts and a "Page X of Y" footer.
//!
//! Layout works top-down in points from the top edge and emits draw
//! operations in PDF user space (origin bottom-left). A row or chart that does
//! not fit in the remaining space starts a new page. A row taller than a whole
//! page is split between wrapped lines and continues below the repeated header
//! on the following pages.

use tradegrid_core::config::{mm_to_pt, PdfSettings};

use super::raster::ChartImage;
use crate::error::PdfError;
use crate::table::TableData;

const CELL_PADDING: f64 = 4.0;
const LINE_SPACING: f64 = 1.2;
const FOOTER_FONT_SIZE: f64 = 8.0;
const GENERATED_FONT_SIZE: f64 = 10.0;
const WHITE: [u8; 3] = [255, 255, 255];
const BODY_TEXT: [u8; 3] = [40, 40, 40];
const SUBTITLE_TEXT: [u8; 3] = [60, 60, 60];
const MUTED_TEXT: [u8; 3] = [100, 100, 100];
const FOOTER_TEXT: [u8; 3] = [150, 150, 150];

// ─── Fonts ──────────────────────────────────────────────────────────

/// The two standard Type 1 fonts used by every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    pub(crate) fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    fn glyph_width(self, ch: char) -> u16 {
        let table = match self {
            Self::Regular => &HELVETICA_WIDTHS,
            Self::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => 556,
        }
    }
}

/// Advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    text.chars().map(|ch| font.glyph_width(ch) as f64).sum::<f64>() * size / 1000.0
}

/// Greedy word wrap. Words wider than `max_width` are broken between
/// characters. Explicit newlines start a new line. Always returns at least
/// one (possibly empty) line.
pub fn wrap_text(text: &str, max_width: f64, font: Font, size: f64) -> Vec<String> {
    let fits = |s: &str| text_width(s, font, size) <= max_width;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }
            for ch in word.chars() {
                let mut next = line.clone();
                next.push(ch);
                if !line.is_empty() && !fits(&next) {
                    lines.push(std::mem::replace(&mut line, ch.to_string()));
                } else {
                    line = next;
                }
            }
        }
        lines.push(line);
    }
    lines
}

// ─── Draw operations ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: [u8; 3],
        text: String,
    },
    /// `y` is the bottom edge.
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: [u8; 3],
    },
    /// `index` points into the document's chart list.
    Image {
        index: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

/// Everything placed on the pages.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub generated: &'a str,
    pub table: &'a TableData,
    pub charts: &'a [ChartImage],
    pub settings: &'a PdfSettings,
}

// ─── Composer ───────────────────────────────────────────────────────

struct Composer<'a> {
    settings: &'a PdfSettings,
    page_width: f64,
    page_height: f64,
    margin: f64,
    done: Vec<PageLayout>,
    page: PageLayout,
    /// Distance of the next free line from the top edge.
    top: f64,
}

impl<'a> Composer<'a> {
    fn new(settings: &'a PdfSettings) -> Result<Self, PdfError> {
        let (page_width, page_height) = settings.page_size_pt();
        let margin = settings.margin_pt();
        if page_width - 2.0 * margin <= 0.0 || page_height - 2.0 * margin <= 0.0 {
            return Err(PdfError::Layout(format!(
                "{}mm margins leave no printable area",
                settings.margin_mm
            )));
        }
        Ok(Self {
            settings,
            page_width,
            page_height,
            margin,
            done: Vec::new(),
            page: PageLayout::default(),
            top: margin,
        })
    }

    fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    fn remaining(&self) -> f64 {
        self.page_height - self.margin - self.top
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.page));
        self.top = self.margin;
    }

    fn text(&mut self, x: f64, baseline: f64, size: f64, font: Font, color: [u8; 3], text: &str) {
        if text.is_empty() {
            return;
        }
        self.page.ops.push(DrawOp::Text {
            x,
            y: self.page_height - baseline,
            size,
            font,
            color,
            text: text.to_string(),
        });
    }

    fn fill(&mut self, x: f64, top: f64, width: f64, height: f64, color: [u8; 3]) {
        self.page.ops.push(DrawOp::FillRect {
            x,
            y: self.page_height - top - height,
            width,
            height,
            color,
        });
    }

    fn title_block(&mut self, title: &str, subtitle: Option<&str>, generated: &str) {
        let s = self.settings;
        let x = self.margin;
        let mut baseline = self.margin + mm_to_pt(6.0);
        self.text(x, baseline, s.title_font_size, Font::Bold, s.accent_rgb, title);
        baseline += mm_to_pt(8.0);
        if let Some(subtitle) = subtitle.filter(|t| !t.trim().is_empty()) {
            self.text(x, baseline, s.subtitle_font_size, Font::Regular, SUBTITLE_TEXT, subtitle);
            baseline += mm_to_pt(8.0);
        }
        self.text(x, baseline, GENERATED_FONT_SIZE, Font::Regular, MUTED_TEXT, generated);
        self.top = baseline + mm_to_pt(10.0) - GENERATED_FONT_SIZE;
    }

    fn column_widths(&self, table: &TableData) -> Result<Vec<f64>, PdfError> {
        let size = self.settings.body_font_size;
        let content = self.content_width();
        let count = table.column_count();
        let cap = (content * 0.4).max(content / count as f64);
        let natural: Vec<f64> = (0..count)
            .map(|col| {
                let header = text_width(&table.headers[col], Font::Bold, size);
                let body = table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| text_width(cell, Font::Regular, size))
                    .fold(0.0, f64::max);
                (header.max(body) + 2.0 * CELL_PADDING).min(cap)
            })
            .collect();
        let total: f64 = natural.iter().sum();
        let widths: Vec<f64> = natural.iter().map(|w| w * content / total).collect();
        if widths.iter().any(|w| *w - 2.0 * CELL_PADDING < size) {
            return Err(PdfError::Layout(format!(
                "{count} columns do not fit a {content:.0}pt wide page"
            )));
        }
        Ok(widths)
    }

    fn line_height(&self) -> f64 {
        self.settings.body_font_size * LINE_SPACING
    }

    fn draw_row(&mut self, widths: &[f64], cells: &[Vec<String>], height: f64, font: Font, color: [u8; 3]) {
        let size = self.settings.body_font_size;
        let line_height = self.line_height();
        let mut x = self.margin;
        for (width, lines) in widths.iter().zip(cells) {
            for (k, line) in lines.iter().enumerate() {
                let baseline = self.top + CELL_PADDING + size * 0.8 + k as f64 * line_height;
                self.text(x + CELL_PADDING, baseline, size, font, color, line);
            }
            x += width;
        }
        self.top += height;
    }

    fn wrap_row(&self, widths: &[f64], row: &[String], font: Font) -> Vec<Vec<String>> {
        let size = self.settings.body_font_size;
        widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let text = row.get(col).map(String::as_str).unwrap_or("");
                wrap_text(text, width - 2.0 * CELL_PADDING, font, size)
            })
            .collect()
    }

    fn row_height(&self, cells: &[Vec<String>]) -> f64 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        lines as f64 * self.line_height() + 2.0 * CELL_PADDING
    }

    fn header_row(&mut self, widths: &[f64], header: &[Vec<String>], height: f64) {
        let accent = self.settings.accent_rgb;
        let content = self.content_width();
        self.fill(self.margin, self.top, content, height, accent);
        self.draw_row(widths, header, height, Font::Bold, WHITE);
    }

    fn table(&mut self, table: &TableData) -> Result<(), PdfError> {
        if table.column_count() == 0 {
            return Ok(());
        }
        let widths = self.column_widths(table)?;
        let header = self.wrap_row(&widths, &table.headers, Font::Bold);
        let header_height = self.row_height(&header);
        if header_height > self.remaining() {
            self.new_page();
        }
        self.header_row(&widths, &header, header_height);
        let mut fresh_page = true;

        for (index, row) in table.rows.iter().enumerate() {
            let mut cells = self.wrap_row(&widths, row, Font::Regular);
            if self.row_height(&cells) > self.remaining() && !fresh_page {
                self.new_page();
                self.header_row(&widths, &header, header_height);
            }
            loop {
                let height = self.row_height(&cells);
                if height <= self.remaining() {
                    self.body_row(index, &widths, &cells, height);
                    break;
                }
                let fit = ((self.remaining() - 2.0 * CELL_PADDING) / self.line_height())
                    .floor()
                    .max(1.0) as usize;
                let rest: Vec<Vec<String>> = cells
                    .iter_mut()
                    .map(|lines| lines.split_off(fit.min(lines.len())))
                    .collect();
                let height = self.row_height(&cells);
                self.body_row(index, &widths, &cells, height);
                if rest.iter().all(Vec::is_empty) {
                    break;
                }
                cells = rest;
                self.new_page();
                self.header_row(&widths, &header, header_height);
            }
            fresh_page = false;
        }
        Ok(())
    }

    fn body_row(&mut self, index: usize, widths: &[f64], cells: &[Vec<String>], height: f64) {
        if index % 2 == 1 {
            let stripe = self.settings.stripe_rgb;
            let content = self.content_width();
            self.fill(self.margin, self.top, content, height, stripe);
        }
        self.draw_row(widths, cells, height, Font::Regular, BODY_TEXT);
    }

    fn charts(&mut self, charts: &[ChartImage]) -> Result<(), PdfError> {
        let gap = mm_to_pt(6.0);
        let caption_size = self.settings.subtitle_font_size;
        let content = self.content_width();
        for (index, chart) in charts.iter().enumerate() {
            self.top += gap;
            let caption_height = if chart.caption.is_some() { caption_size * 1.6 } else { 0.0 };
            let usable = self.page_height - 2.0 * self.margin - caption_height;
            if usable <= 0.0 {
                return Err(PdfError::Layout("no vertical room for a chart".into()));
            }
            let aspect = chart.image.aspect();
            let mut width = chart.width_pt.unwrap_or(content).clamp(1.0, content);
            let mut height = width * aspect;
            if height > usable {
                height = usable;
                width = height / aspect;
            }
            let block = caption_height + height;
            if block > self.remaining() {
                self.new_page();
            }
            if let Some(caption) = &chart.caption {
                let baseline = self.top + caption_size;
                self.text(self.margin, baseline, caption_size, Font::Bold, SUBTITLE_TEXT, caption);
            }
            let image_top = self.top + caption_height;
            self.page.ops.push(DrawOp::Image {
                index,
                x: self.margin + (content - width) / 2.0,
                y: self.page_height - image_top - height,
                width,
                height,
            });
            self.top += block;
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.done.push(std::mem::take(&mut self.page));
        let total = self.done.len();
        let x = self.page_width - mm_to_pt(30.0);
        let y = mm_to_pt(10.0);
        for (i, page) in self.done.iter_mut().enumerate() {
            page.ops.push(DrawOp::Text {
                x,
                y,
                size: FOOTER_FONT_SIZE,
                font: Font::Regular,
                color: FOOTER_TEXT,
                text: format!("Page {} of {}", i + 1, total),
            });
        }
        self.done
    }
}

/// Lay out a whole document. There is always at least one page.
pub fn lay_out(input: &LayoutInput<'_>) -> Result<Vec<PageLayout>, PdfError> {
    let mut composer = Composer::new(input.settings)?;
    composer.title_block(input.title, input.subtitle, input.generated);
    composer.table(input.table)?;
    composer.charts(input.charts)?;
    Ok(composer.finish())
}
