//! Error types for the pdf2cbz library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2CbzError`] — **Fatal**: the batch cannot be set up at all
//!   (input path missing, unrecognised extension, output directory could
//!   not be created). Returned as `Err(Pdf2CbzError)` from
//!   [`crate::jobs::enumerate_jobs`] and [`crate::dispatch::run_batch`]
//!   before any job runs.
//!
//! * [`ConversionError`] — **Non-fatal**: a single conversion job failed
//!   (corrupt PDF, encode glitch, unwritable output) but all other jobs
//!   are fine. Captured by the dispatcher as a `Failure` outcome in
//!   [`crate::dispatch::JobResult`] so the rest of the batch runs to
//!   completion.
//!
//! The separation is the failure-isolation contract of the batch layer:
//! enumeration-time errors abort immediately, dispatch-time errors are
//! surfaced only in the affected job's result.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2cbz library.
///
/// Per-job failures use [`ConversionError`] and are stored in
/// [`crate::dispatch::JobResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2CbzError {
    /// Input path was not found.
    #[error("input path not found: '{path}'\nCheck the path exists and is readable.", path = .path.display())]
    PathNotFound { path: PathBuf },

    /// Single-file input has an extension this tool does not convert.
    #[error("unsupported extension on '{path}'\nSupported inputs: .pdf (to CBZ), .cbz / .zip (to PDF).", path = .path.display())]
    UnsupportedExtension { path: PathBuf },

    /// The supplied output directory could not be created.
    #[error("failed to create output directory '{path}': {source}", path = .path.display())]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (worker pool construction and the like).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single conversion job.
///
/// Produced by [`crate::convert::convert_file`] and recorded by the
/// dispatcher as a `Failure` outcome. A failing job never aborts its
/// siblings.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ConversionError {
    /// The input document or archive could not be opened.
    #[error("failed to open '{path}': {detail}", path = .path.display())]
    OpenFailed { path: PathBuf, detail: String },

    /// pdfium returned an error while rasterising a page.
    #[error("page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// A rasterised page could not be encoded to the target image format.
    #[error("page {page}: image encoding failed: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The zip archive is corrupt, unreadable, or holds no page images.
    #[error("archive '{path}': {detail}", path = .path.display())]
    ArchiveFailed { path: PathBuf, detail: String },

    /// An archive entry could not be decoded as an image.
    #[error("entry '{entry}': image decode failed: {detail}")]
    DecodeFailed { entry: String, detail: String },

    /// pdfium returned an error while composing an output PDF page.
    #[error("page {page}: PDF composition failed: {detail}")]
    ComposeFailed { page: usize, detail: String },

    /// The output file could not be created or written.
    #[error("failed to write '{path}': {detail}", path = .path.display())]
    WriteFailed { path: PathBuf, detail: String },
}
