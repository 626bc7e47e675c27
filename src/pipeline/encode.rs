//! Page image encoding: `DynamicImage` → PNG or WebP bytes.
//!
//! ## Why two encoders?
//!
//! PNG goes through the `image` crate and is lossless — the right choice
//! for archival copies, line art, and pages with fine screentone. WebP
//! goes through the `webp` crate (libwebp) because the `image` crate's
//! WebP encoder is lossless-only and cannot honour a quality setting;
//! lossy WebP at quality 80 is the format comic readers expect from a
//! space-efficient CBZ.

use crate::config::{ConversionOptions, ImageFormat};
use crate::error::ConversionError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode one rasterised page to the configured format.
///
/// Applies the grayscale conversion first when requested: PNG stores the
/// result as a true single-channel image; WebP re-expands to RGB because
/// libwebp has no grayscale colour space, but the pixels stay gray.
pub fn encode_page(
    page_num: usize,
    image: &DynamicImage,
    options: &ConversionOptions,
) -> Result<Vec<u8>, ConversionError> {
    let gray;
    let image = if options.grayscale {
        gray = DynamicImage::ImageLuma8(image.to_luma8());
        &gray
    } else {
        image
    };

    let bytes = match options.image_format {
        ImageFormat::Png => {
            let mut buf = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| ConversionError::EncodeFailed {
                    page: page_num,
                    detail: e.to_string(),
                })?;
            buf
        }
        ImageFormat::Webp => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder =
                webp::Encoder::from_image(&rgb).map_err(|e| ConversionError::EncodeFailed {
                    page: page_num,
                    detail: e.to_string(),
                })?;
            encoder.encode(options.quality as f32).to_vec()
        }
    };

    debug!(
        "encoded page {} → {} {} bytes",
        page_num,
        bytes.len(),
        options.image_format
    );

    Ok(bytes)
}
