//! QR code rendering for short links.

use image::{ImageBuffer, Luma};
use qrcode::QrCode;
use std::io::Cursor;

use crate::constants::{MAX_QR_SIZE, MIN_QR_SIZE};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
}

impl QrFormat {
    /// Anything that is not "svg" renders as PNG.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("svg") {
            QrFormat::Svg
        } else {
            QrFormat::Png
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
        }
    }
}

/// Render a QR code for the given URL.
///
/// `size` is a minimum edge length in pixels and is clamped to the
/// supported range before rendering.
pub fn generate(url: &str, format: QrFormat, size: u32) -> Result<Vec<u8>, AppError> {
    let size = size.clamp(MIN_QR_SIZE, MAX_QR_SIZE);
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to generate QR code: {}", e)))?;

    match format {
        QrFormat::Png => encode_png(&code, size),
        QrFormat::Svg => Ok(encode_svg(&code, size)),
    }
}

fn encode_png(code: &QrCode, size: u32) -> Result<Vec<u8>, AppError> {
    let image: ImageBuffer<Luma<u8>, Vec<u8>> =
        code.render::<Luma<u8>>().min_dimensions(size, size).build();

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("Failed to encode PNG: {}", e)))?;

    Ok(buffer.into_inner())
}

fn encode_svg(code: &QrCode, size: u32) -> Vec<u8> {
    code.render()
        .min_dimensions(size, size)
        .dark_color(qrcode::render::svg::Color("#000000"))
        .light_color(qrcode::render::svg::Color("#ffffff"))
        .build()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_defaults_to_png() {
        assert_eq!(QrFormat::parse("svg"), QrFormat::Svg);
        assert_eq!(QrFormat::parse("SVG"), QrFormat::Svg);
        assert_eq!(QrFormat::parse("png"), QrFormat::Png);
        assert_eq!(QrFormat::parse("webp"), QrFormat::Png);
        assert_eq!(QrFormat::default(), QrFormat::Png);
    }

    #[test]
    fn png_output_carries_the_magic_bytes() {
        let bytes = generate("http://localhost:8080/abc123", QrFormat::Png, 256).unwrap();
        assert!(bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn svg_output_is_markup() {
        let bytes = generate("http://localhost:8080/abc123", QrFormat::Svg, 128).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(QrFormat::Svg.content_type(), "image/svg+xml");
    }

    #[test]
    fn out_of_range_sizes_are_clamped() {
        // A 10000px request must not blow up; it renders at the cap
        assert!(generate("http://localhost:8080/x", QrFormat::Svg, 10_000).is_ok());
        assert!(generate("http://localhost:8080/x", QrFormat::Png, 1).is_ok());
    }
}
