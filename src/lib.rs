//! # pdf2cbz
//!
//! Convert PDF documents to CBZ comic-book archives, and back.
//!
//! ## Why this crate?
//!
//! Comic readers want CBZ: a plain zip of sequentially named page
//! images. Reading scanned comics as PDFs means a heavyweight viewer and
//! no control over page image size. This crate rasterises each PDF page
//! via pdfium, encodes it as PNG or lossy WebP, and packs the pages into
//! a CBZ — or runs the other way, composing the page images of an
//! existing CBZ/ZIP into a PDF. A batch layer converts whole directory
//! trees on a bounded worker pool, one result per file, without letting
//! a single corrupt file sink the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input path
//!  │
//!  ├─ 1. Enumerate  single file or recursive directory walk → jobs
//!  ├─ 2. Dispatch   bounded rayon pool, per-job failure isolation
//!  │
//!  │      per job, PDF → CBZ:
//!  ├─ 3. Render     rasterise pages via pdfium at the target DPI
//!  ├─ 4. Encode     PNG (lossless) or WebP (lossy, quality 1–100)
//!  └─ 5. Archive    zip entries page_0001.webp, page_0002.webp, …
//!
//!        per job, CBZ → PDF: read archive → decode → compose pages
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2cbz::{enumerate_jobs, run_batch, ConversionOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConversionOptions::default();
//!     let jobs = enumerate_jobs(Path::new("comics/"), None, &options)?;
//!     let workers = options.workers;
//!     let results = run_batch(jobs, workers, |result| {
//!         println!("{}: {}", result.input_path.display(), result.outcome.message());
//!     })?;
//!     eprintln!(
//!         "{} succeeded",
//!         results.iter().filter(|r| r.outcome.is_success()).count()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2cbz` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! pdf2cbz = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod jobs;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, ConversionOptionsBuilder, ImageFormat};
pub use convert::convert_file;
pub use dispatch::{run_batch, run_batch_with, JobOutcome, JobResult};
pub use error::{ConversionError, Pdf2CbzError};
pub use jobs::{enumerate_jobs, ConversionJob, Direction};
