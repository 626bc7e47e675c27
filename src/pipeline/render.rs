//! PDF rasterisation: render each page to a `DynamicImage` via pdfium.
//!
//! ## Why a sink callback?
//!
//! A 200-page comic rendered at 150 DPI is gigabytes of raw RGBA if held
//! all at once. Pages are therefore handed to the caller one at a time
//! through a sink closure — the caller encodes and writes each page into
//! the archive before the next one is rendered, keeping peak memory at a
//! single page.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 150 DPI would produce a
//! 12,000 × 17,000 px image. [`MAX_RENDER_PIXELS`] caps the rendered
//! width regardless of physical page size, keeping memory bounded for
//! pathological documents while normal comic pages render at exactly the
//! requested DPI.

use crate::config::ConversionOptions;
use crate::error::ConversionError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterisation resolution used when no DPI override is supplied.
pub const DEFAULT_DPI: u32 = 150;

/// Upper bound on the rendered width of a single page, in pixels.
const MAX_RENDER_PIXELS: u32 = 10_000;

/// Rasterise every page of a PDF, feeding each image to `sink` as
/// `(page_number_1based, image)`.
///
/// Returns the number of pages rendered. Stops at the first sink error so
/// a broken archive write aborts the job without rendering further pages.
pub fn rasterize_pdf<F>(
    pdf_path: &Path,
    options: &ConversionOptions,
    mut sink: F,
) -> Result<usize, ConversionError>
where
    F: FnMut(usize, DynamicImage) -> Result<(), ConversionError>,
{
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| ConversionError::OpenFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;

    let dpi = options.dpi.unwrap_or(DEFAULT_DPI);
    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages at {} DPI", total, dpi);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        // PDF points are 1/72 inch; scale the page width to the target DPI.
        let width_pts = page.width().value;
        let target_width = ((width_pts * dpi as f32 / 72.0).round() as u32)
            .clamp(1, MAX_RENDER_PIXELS);

        let render_config = PdfRenderConfig::new().set_target_width(target_width as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ConversionError::RenderFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        sink(page_num, image)?;
    }

    Ok(total)
}
