use thiserror::Error;

/// Failure while building an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF construction failed: {0}")]
    Pdf(#[from] PdfError),
    #[error("no columns to export")]
    NoColumns,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PdfError {
    #[error("could not decode chart image: {0}")]
    Decode(String),
    #[error("raw image buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    RasterSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image has zero width or height")]
    EmptyImage,
    #[error("page has no room for content: {0}")]
    Layout(String),
    #[error("stream compression failed: {0}")]
    Deflate(String),
}
