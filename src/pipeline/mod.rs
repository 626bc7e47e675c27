//! Per-file conversion stages.
//!
//! Each module is one stage of the linear pipeline that
//! [`crate::convert::convert_file`] wires together:
//!
//! ```text
//! PDF → CBZ:   render (pdfium) → encode (png/webp) → archive (zip write)
//! CBZ → PDF:   archive (zip read) → compose (pdfium document build)
//! ```
//!
//! The stages operate on one page at a time wherever the data flow
//! allows, so a long document never holds all of its rasterised pages in
//! memory at once.

pub mod archive;
pub mod compose;
pub mod encode;
pub mod render;
