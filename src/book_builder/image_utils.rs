//! Page image normalization.
//!
//! Whatever the catalog serves (jpeg/png/webp) is decoded, flattened to RGB8
//! and re-encoded as JPEG, the one color model the PDF embedding expects.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;

pub(crate) struct NormalizedPage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub(crate) fn normalize_to_jpeg(bytes: &[u8], quality: u8) -> Result<NormalizedPage> {
    let img = image::load_from_memory(bytes).context("decoding page image")?;
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width(), rgb.height());

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    encoder
        .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .context("encoding page as jpeg")?;

    Ok(NormalizedPage {
        jpeg,
        width,
        height,
    })
}
