//! Image encoding: `DynamicImage` → baseline JPEG bytes.
//!
//! PDF viewers decode `/DCTDecode` streams natively, so the encoded bytes are
//! embedded as-is. Alpha is dropped and the image flattened to 8-bit RGB,
//! matching the `/DeviceRGB` colour space of the embedded XObject.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// A JPEG-encoded page raster.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Encode a rasterised page as RGB JPEG at `quality` (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedPage, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let (width, height) = (rgb.width(), rgb.height());

    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)))?;

    debug!(
        "Encoded {}x{} px → {} bytes JPEG (q={})",
        width,
        height,
        jpeg.len(),
        quality
    );

    Ok(EncodedPage {
        jpeg,
        width,
        height,
    })
}
