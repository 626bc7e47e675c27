//! Per-file conversion: the collaborator the batch dispatcher invokes.
//!
//! [`convert_file`] is the single boundary between the batch layer and
//! the document pipeline. It wires the pipeline stages together for one
//! job and reports either a human-readable summary line or a
//! [`ConversionError`] for the dispatcher to record — it never touches
//! any state outside its own job's input and output paths, which is what
//! makes jobs safe to run on concurrent workers.

use crate::error::ConversionError;
use crate::jobs::{ConversionJob, Direction};
use crate::pipeline::{archive, compose, encode, render};
use std::time::Instant;
use tracing::info;

/// Convert one file according to its job description.
///
/// Returns the per-job report line on success.
pub fn convert_file(job: &ConversionJob) -> Result<String, ConversionError> {
    let start = Instant::now();
    info!(
        "converting {} → {}",
        job.input_path.display(),
        job.output_path.display()
    );

    let pages = match job.direction {
        Direction::PdfToCbz => pdf_to_cbz(job)?,
        Direction::CbzToPdf => cbz_to_pdf(job)?,
    };

    Ok(format!(
        "{} → {} ({} pages, {}ms)",
        job.input_path.display(),
        job.output_path.display(),
        pages,
        start.elapsed().as_millis()
    ))
}

/// Rasterise a PDF page by page, encoding and archiving each page before
/// the next is rendered.
fn pdf_to_cbz(job: &ConversionJob) -> Result<usize, ConversionError> {
    let mut cbz = archive::CbzWriter::create(&job.output_path)?;

    render::rasterize_pdf(&job.input_path, &job.options, |page_num, image| {
        let bytes = encode::encode_page(page_num, &image, &job.options)?;
        cbz.add_page(page_num, job.options.image_format, &bytes)
    })?;

    cbz.finish()
}

/// Unpack the archive's page images and compose them into a PDF.
fn cbz_to_pdf(job: &ConversionJob) -> Result<usize, ConversionError> {
    let pages = archive::read_pages(&job.input_path)?;
    compose::write_pdf(&job.output_path, &pages, &job.options)
}
