//! Image encoding: `DynamicImage` → base64 PNG plus pixel dimensions.
//!
//! PNG is chosen over JPEG because it is lossless — text crispness matters
//! far more than file size for transcription accuracy. The pixel dimensions
//! travel with the encoded payload because the cost estimator derives image
//! tokens from geometry alone.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// A page image ready for the vision API.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// Base64 of the PNG bytes.
    pub base64: String,
    /// Pixel width of the rendered page.
    pub width: u32,
    /// Pixel height of the rendered page.
    pub height: u32,
}

/// Encode a rasterised page as base64 PNG, keeping its dimensions.
pub fn encode_page(img: &DynamicImage) -> Result<EncodedPage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let base64 = STANDARD.encode(&buf);
    debug!(
        "encoded {}x{} page → {} bytes base64",
        img.width(),
        img.height(),
        base64.len()
    );

    Ok(EncodedPage {
        base64,
        width: img.width(),
        height: img.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_reports_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(48, 24, Rgba([0, 0, 255, 255])));
        let page = encode_page(&img).expect("encode should succeed");
        assert_eq!(page.width, 48);
        assert_eq!(page.height, 24);
        assert!(!page.base64.is_empty());
        // The payload must decode back to PNG bytes.
        let decoded = STANDARD.decode(&page.base64).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }
}
