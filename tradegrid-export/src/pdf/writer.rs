//! PDF 1.4 serialization of laid-out pages.
//!
//! Object order: catalog, page tree, the two fonts, the info dictionary,
//! image XObjects, then one page object and one content stream per page.
//! Every stream is zlib-compressed (`/FlateDecode`).

use std::io::Write;

use chrono::NaiveDateTime;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::layout::{DrawOp, Font, PageLayout};
use super::raster::RasterImage;
use crate::error::PdfError;

const CATALOG: usize = 1;
const PAGE_TREE: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_IMAGE: usize = 6;

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub created: NaiveDateTime,
}

struct ObjectWriter {
    buf: Vec<u8>,
    /// Byte offset of object `n` at index `n - 1`.
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: vec![0; object_count],
        }
    }

    fn push(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets[id - 1] = self.buf.len();
        self.push(&format!("{id} 0 obj\n{body}\nendobj\n"));
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) -> Result<(), PdfError> {
        let packed = deflate(data).map_err(|e| PdfError::Deflate(format!("object {id}: {e}")))?;
        self.offsets[id - 1] = self.buf.len();
        let dict = if dict.is_empty() {
            String::new()
        } else {
            format!("{dict} ")
        };
        self.push(&format!(
            "{id} 0 obj\n<< {dict}/Filter /FlateDecode /Length {} >>\nstream\n",
            packed.len()
        ));
        self.buf.extend_from_slice(&packed);
        self.push("\nendstream\nendobj\n");
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        let xref = self.buf.len();
        let size = self.offsets.len() + 1;
        self.push(&format!("xref\n0 {size}\n0000000000 65535 f \n"));
        let entries: String = self
            .offsets
            .iter()
            .map(|offset| format!("{offset:010} 00000 n \n"))
            .collect();
        self.push(&entries);
        self.push(&format!(
            "trailer\n<< /Size {size} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        ));
        self.buf
    }
}

/// Serialize `pages` into a complete PDF file. `images` are indexed by
/// [`DrawOp::Image::index`].
pub fn write_pdf(
    pages: &[PageLayout],
    images: &[&RasterImage],
    info: &DocumentInfo<'_>,
    page_size: (f64, f64),
) -> Result<Vec<u8>, PdfError> {
    let first_page = FIRST_IMAGE + images.len();
    let page_id = |i: usize| first_page + 2 * i;
    let object_count = first_page - 1 + 2 * pages.len();
    let mut out = ObjectWriter::new(object_count);

    out.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGE_TREE} 0 R >>"));
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_id(i))).collect();
    out.object(
        PAGE_TREE,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
    );
    for (id, font) in [(FONT_REGULAR, Font::Regular), (FONT_BOLD, Font::Bold)] {
        out.object(
            id,
            &format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            ),
        );
    }
    out.object(
        INFO,
        &format!(
            "<< /Title ({}) /Producer (TradeGrid) /CreationDate (D:{}) >>",
            escape_text(info.title),
            info.created.format("%Y%m%d%H%M%S")
        ),
    );

    for (i, image) in images.iter().enumerate() {
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8",
            image.width(),
            image.height()
        );
        out.stream(FIRST_IMAGE + i, &dict, image.data())?;
    }

    let fonts = format!(
        "/Font << /{} {FONT_REGULAR} 0 R /{} {FONT_BOLD} 0 R >>",
        Font::Regular.resource_name(),
        Font::Bold.resource_name()
    );
    let xobjects = if images.is_empty() {
        String::new()
    } else {
        let refs: Vec<String> = (0..images.len())
            .map(|i| format!("/Im{i} {} 0 R", FIRST_IMAGE + i))
            .collect();
        format!(" /XObject << {} >>", refs.join(" "))
    };
    let (width, height) = page_size;
    for (i, page) in pages.iter().enumerate() {
        let id = page_id(i);
        out.object(
            id,
            &format!(
                "<< /Type /Page /Parent {PAGE_TREE} 0 R /MediaBox [0 0 {} {}] /Resources << {fonts}{xobjects} >> /Contents {} 0 R >>",
                num(width),
                num(height),
                id + 1
            ),
        );
        out.stream(id + 1, "", &content_stream(page))?;
    }

    Ok(out.finish())
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn content_stream(page: &PageLayout) -> Vec<u8> {
    let mut out = Vec::new();
    for op in &page.ops {
        let line = match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => format!(
                "q {} rg {} {} {} {} re f Q\n",
                rgb(*color),
                num(*x),
                num(*y),
                num(*width),
                num(*height)
            ),
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => format!(
                "BT /{} {} Tf {} rg {} {} Td ({}) Tj ET\n",
                font.resource_name(),
                num(*size),
                rgb(*color),
                num(*x),
                num(*y),
                escape_text(text)
            ),
            DrawOp::Image {
                index,
                x,
                y,
                width,
                height,
            } => format!(
                "q {} 0 0 {} {} {} cm /Im{index} Do Q\n",
                num(*width),
                num(*height),
                num(*x),
                num(*y)
            ),
        };
        out.extend_from_slice(line.as_bytes());
    }
    out
}

fn num(n: f64) -> String {
    let text = format!("{n:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn rgb(color: [u8; 3]) -> String {
    let [r, g, b] = color.map(|c| num(c as f64 / 255.0));
    format!("{r} {g} {b}")
}

/// Encode text as a PDF literal string body in WinAnsiEncoding.
/// Characters outside the encoding become `?`.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi(ch) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            byte @ 0x20..=0x7E => out.push(byte as char),
            byte => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

fn win_ansi(ch: char) -> u8 {
    match ch {
        '\t' | '\r' | '\n' => b' ',
        c if (c as u32) < 0x20 => b'?',
        c if (c as u32) < 0x7F => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}
