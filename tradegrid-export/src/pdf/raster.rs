//! Raster images that can be placed in a PDF.
//!
//! Encoded charts (PNG as produced by chart canvases, JPEG, and whatever else
//! the `image` crate reads) are decoded to 8-bit RGB. Transparent pixels are
//! composited over white. The writer Flate-compresses the pixel data.

use crate::error::PdfError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Decode an encoded image, sniffing the format from its signature.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, PdfError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| PdfError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            data.extend([r, g, b].map(|c| over_white(c, a)));
        }
        Self::rgb8(width, height, data)
    }

    /// Interleaved 8-bit RGB, row-major, no padding.
    pub fn rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PdfError> {
        if width == 0 || height == 0 {
            return Err(PdfError::EmptyImage);
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(PdfError::RasterSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Height over width.
    pub fn aspect(&self) -> f64 {
        self.height as f64 / self.width as f64
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// A pre-rendered chart placed below the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub caption: Option<String>,
    pub image: RasterImage,
    /// Preferred width in points; `None` spans the content width.
    pub width_pt: Option<f64>,
}

impl ChartImage {
    pub fn new(image: RasterImage) -> Self {
        Self {
            caption: None,
            image,
            width_pt: None,
        }
    }

    /// Decode `bytes` and wrap the result.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, PdfError> {
        RasterImage::from_encoded(bytes).map(Self::new)
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_width(mut self, width_pt: f64) -> Self {
        self.width_pt = Some(width_pt);
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    /// A PNG chart with a transparent background and one opaque red pixel
    /// in the top-left corner.
    pub(crate) fn png_chart(width: u32, height: u32) -> Vec<u8> {
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        canvas.put_pixel(0, 0, Rgba([220, 20, 60, 255]));
        encode(DynamicImage::ImageRgba8(canvas), ImageFormat::Png)
    }

    #[test]
    fn decodes_png_and_flattens_alpha_onto_white() {
        let image = RasterImage::from_encoded(&png_chart(320, 200)).unwrap();
        assert_eq!((image.width(), image.height()), (320, 200));
        assert!((image.aspect() - 0.625).abs() < 1e-9);
        assert_eq!(image.data().len(), 320 * 200 * 3);
        assert_eq!(&image.data()[..3], &[220, 20, 60]);
        assert_eq!(&image.data()[3..6], &[255, 255, 255]);
    }

    #[test]
    fn half_transparent_pixels_blend() {
        assert_eq!(over_white(0, 255), 0);
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(0, 128), 127);
        assert_eq!(over_white(200, 255), 200);
    }

    #[test]
    fn decodes_jpeg() {
        let photo = RgbImage::from_pixel(16, 8, Rgb([30, 120, 200]));
        let bytes = encode(DynamicImage::ImageRgb8(photo), ImageFormat::Jpeg);
        let image = RasterImage::from_encoded(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (16, 8));
        let expected = [30i16, 120, 200];
        for (got, want) in image.data()[..3].iter().zip(expected) {
            assert!((*got as i16 - want).abs() <= 8, "{got} vs {want}");
        }
    }

    #[test]
    fn rejects_undecodable_bytes() {
        assert!(matches!(RasterImage::from_encoded(b"not an image"), Err(PdfError::Decode(_))));
        let mut cut = png_chart(4, 4);
        cut.truncate(20);
        assert!(matches!(ChartImage::from_encoded(&cut), Err(PdfError::Decode(_))));
    }

    #[test]
    fn rgb_buffer_must_match_dimensions() {
        assert!(RasterImage::rgb8(2, 2, vec![0; 12]).is_ok());
        assert_eq!(
            RasterImage::rgb8(2, 2, vec![0; 11]),
            Err(PdfError::RasterSize {
                width: 2,
                height: 2,
                expected: 12,
                actual: 11
            })
        );
        assert_eq!(RasterImage::rgb8(0, 2, vec![]), Err(PdfError::EmptyImage));
    }
}
