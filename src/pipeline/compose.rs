//! PDF composition: decoded page images → a new PDF document via pdfium.
//!
//! Each image becomes one page sized so the image fills it edge to edge
//! at the configured DPI: `points = pixels * 72 / dpi`. A 1500 px wide
//! page at 150 DPI therefore composes to a 720 pt (10 inch) page, which
//! round-trips a previous PDF → CBZ conversion back to the original page
//! geometry.

use crate::config::ConversionOptions;
use crate::error::ConversionError;
use crate::pipeline::render::DEFAULT_DPI;
use image::{DynamicImage, GenericImageView};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Compose `pages` into a PDF at `output_path`, one page per image.
///
/// `pages` are `(entry_name, bytes)` pairs in page order, as produced by
/// [`crate::pipeline::archive::read_pages`]. Returns the page count.
pub fn write_pdf(
    output_path: &Path,
    pages: &[(String, Vec<u8>)],
    options: &ConversionOptions,
) -> Result<usize, ConversionError> {
    let pdfium = Pdfium::default();

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| ConversionError::ComposeFailed {
            page: 0,
            detail: format!("{e:?}"),
        })?;

    let dpi = options.dpi.unwrap_or(DEFAULT_DPI) as f32;

    for (idx, (name, bytes)) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let image = image::load_from_memory(bytes).map_err(|e| ConversionError::DecodeFailed {
            entry: name.clone(),
            detail: e.to_string(),
        })?;

        let image = if options.grayscale {
            DynamicImage::ImageLuma8(image.to_luma8())
        } else {
            image
        };

        let (width_px, height_px) = image.dimensions();
        let width = PdfPoints::new(width_px as f32 * 72.0 / dpi);
        let height = PdfPoints::new(height_px as f32 * 72.0 / dpi);

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(|e| ConversionError::ComposeFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let mut image_object =
            PdfPageImageObject::new(&document, &image).map_err(|e| {
                ConversionError::ComposeFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                }
            })?;

        // The image object is created at 1x1 pt; scale it to cover the page.
        image_object
            .scale(width.value, height.value)
            .map_err(|e| ConversionError::ComposeFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        page.objects_mut()
            .add_object(PdfPageObject::Image(image_object))
            .map_err(|e| ConversionError::ComposeFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        debug!("composed page {page_num} from '{name}' ({width_px}x{height_px} px)");
    }

    document
        .save_to_file(output_path)
        .map_err(|e| ConversionError::WriteFailed {
            path: output_path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;

    info!(
        "wrote {} ({} pages)",
        output_path.display(),
        pages.len()
    );
    Ok(pages.len())
}
