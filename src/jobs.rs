//! Task enumeration: turn a filesystem input into a list of conversion jobs.
//!
//! The enumerator is the first half of the batch layer. Given a single
//! file or a directory tree it produces the ordered list of
//! [`ConversionJob`] values for the dispatcher, inferring the conversion
//! direction and the output path from file extensions. All of its errors
//! are fatal ([`Pdf2CbzError`]): they fire before any job has run, so
//! there is nothing to isolate yet.
//!
//! ## Why flatten directory output?
//!
//! With `--output <dir>`, converted files land directly in the output
//! directory under their base filename; the source tree's subdirectory
//! structure is not mirrored. Comic libraries are usually shallow and
//! readers present archives as a flat list, so flattening keeps output
//! predictable. Colliding base names overwrite each other — use sibling
//! output (no `--output`) for deeply nested trees.

use crate::config::ConversionOptions;
use crate::error::Pdf2CbzError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Conversion direction, inferred from the input file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `.pdf` input: rasterise pages into a CBZ archive.
    PdfToCbz,
    /// `.cbz` / `.zip` input: compose the page images into a PDF.
    CbzToPdf,
}

impl Direction {
    /// Infer the direction from a path's extension (ASCII case-insensitive).
    ///
    /// Returns `None` for extensions this tool does not convert.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Direction::PdfToCbz),
            "cbz" | "zip" => Some(Direction::CbzToPdf),
            _ => None,
        }
    }

    /// Extension of the file this direction produces.
    pub fn output_extension(self) -> &'static str {
        match self {
            Direction::PdfToCbz => "cbz",
            Direction::CbzToPdf => "pdf",
        }
    }
}

/// One independent input → output conversion unit within a batch.
///
/// Immutable once created; consumed exactly once by the dispatcher.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Source document or archive.
    pub input_path: PathBuf,
    /// Destination file, derived by the enumerator.
    pub output_path: PathBuf,
    /// Which way this job converts.
    pub direction: Direction,
    /// Batch-wide options, read-only for the lifetime of the job.
    pub options: ConversionOptions,
}

/// Enumerate the conversion jobs for an input path.
///
/// * Single file — one job; the extension decides the direction. With no
///   `output`, the output path is the input path with its extension
///   swapped in place. An `output` that is an existing directory receives
///   the base filename with swapped extension; any other `output` is used
///   verbatim as the destination file.
/// * Directory — recursively collects every `.pdf`, `.cbz`, and `.zip`
///   file (other files are ignored, not errors). With an `output`
///   directory the results are flattened into it (created up front,
///   idempotently); without one each result is written next to its
///   source. Zero matches is a valid, empty batch.
///
/// # Errors
/// [`Pdf2CbzError::PathNotFound`] if `input` does not exist,
/// [`Pdf2CbzError::UnsupportedExtension`] for an unconvertible single
/// file, [`Pdf2CbzError::OutputDirFailed`] if the output directory cannot
/// be created.
pub fn enumerate_jobs(
    input: &Path,
    output: Option<&Path>,
    options: &ConversionOptions,
) -> Result<Vec<ConversionJob>, Pdf2CbzError> {
    if !input.exists() {
        return Err(Pdf2CbzError::PathNotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        return single_file_job(input, output, options).map(|job| vec![job]);
    }

    // Directory input. Create the output directory before any job runs;
    // create_dir_all succeeds on an existing directory and is race-safe.
    if let Some(out_dir) = output {
        std::fs::create_dir_all(out_dir).map_err(|e| Pdf2CbzError::OutputDirFailed {
            path: out_dir.to_path_buf(),
            source: e,
        })?;
    }

    let mut jobs = Vec::new();
    for entry in WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Some(direction) = Direction::from_path(path) else {
            continue;
        };

        let output_path = match output {
            // Flattened: base filename with swapped extension.
            Some(out_dir) => match path.file_name() {
                Some(name) => out_dir.join(Path::new(name).with_extension(direction.output_extension())),
                None => continue,
            },
            // Sibling: next to the source file.
            None => path.with_extension(direction.output_extension()),
        };

        debug!(
            "job: {} → {}",
            path.display(),
            output_path.display()
        );

        jobs.push(ConversionJob {
            input_path: path.to_path_buf(),
            output_path,
            direction,
            options: options.clone(),
        });
    }

    debug!("enumerated {} job(s) under {}", jobs.len(), input.display());
    Ok(jobs)
}

fn single_file_job(
    input: &Path,
    output: Option<&Path>,
    options: &ConversionOptions,
) -> Result<ConversionJob, Pdf2CbzError> {
    let direction = Direction::from_path(input).ok_or_else(|| Pdf2CbzError::UnsupportedExtension {
        path: input.to_path_buf(),
    })?;

    let output_path = match output {
        Some(out) if out.is_dir() => match input.file_name() {
            Some(name) => out.join(Path::new(name).with_extension(direction.output_extension())),
            None => input.with_extension(direction.output_extension()),
        },
        Some(out) => out.to_path_buf(),
        None => input.with_extension(direction.output_extension()),
    };

    Ok(ConversionJob {
        input_path: input.to_path_buf(),
        output_path,
        direction,
        options: options.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn direction_from_extension() {
        assert_eq!(
            Direction::from_path(Path::new("a.pdf")),
            Some(Direction::PdfToCbz)
        );
        assert_eq!(
            Direction::from_path(Path::new("a.cbz")),
            Some(Direction::CbzToPdf)
        );
        assert_eq!(
            Direction::from_path(Path::new("a.ZIP")),
            Some(Direction::CbzToPdf)
        );
        assert_eq!(Direction::from_path(Path::new("a.txt")), None);
        assert_eq!(Direction::from_path(Path::new("noext")), None);
    }

    #[test]
    fn single_pdf_derives_cbz_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.pdf");
        touch(&input);

        let jobs = enumerate_jobs(&input, None, &ConversionOptions::default()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_path, dir.path().join("book.cbz"));
        assert_eq!(jobs[0].direction, Direction::PdfToCbz);
    }

    #[test]
    fn single_cbz_derives_pdf_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.cbz");
        touch(&input);

        let jobs = enumerate_jobs(&input, None, &ConversionOptions::default()).unwrap();
        assert_eq!(jobs[0].output_path, dir.path().join("book.pdf"));
        assert_eq!(jobs[0].direction, Direction::CbzToPdf);
    }

    #[test]
    fn single_file_explicit_output_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.pdf");
        touch(&input);
        let out = dir.path().join("elsewhere.cbz");

        let jobs = enumerate_jobs(&input, Some(&out), &ConversionOptions::default()).unwrap();
        assert_eq!(jobs[0].output_path, out);
    }

    #[test]
    fn single_file_output_directory_receives_swapped_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.pdf");
        touch(&input);
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let jobs = enumerate_jobs(&input, Some(&out_dir), &ConversionOptions::default()).unwrap();
        assert_eq!(jobs[0].output_path, out_dir.join("book.cbz"));
    }

    #[test]
    fn unsupported_extension_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        touch(&input);

        let err = enumerate_jobs(&input, None, &ConversionOptions::default()).unwrap_err();
        assert!(matches!(err, Pdf2CbzError::UnsupportedExtension { .. }));
    }

    #[test]
    fn missing_path_is_fatal() {
        let err = enumerate_jobs(
            Path::new("/definitely/not/here.pdf"),
            None,
            &ConversionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2CbzError::PathNotFound { .. }));
    }

    #[test]
    fn directory_enumeration_skips_unmatched_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("b.cbz"));
        touch(&dir.path().join("notes.txt"));

        let jobs = enumerate_jobs(dir.path(), None, &ConversionOptions::default()).unwrap();
        assert_eq!(jobs.len(), 2);

        let mut outputs: Vec<_> = jobs
            .iter()
            .map(|j| j.output_path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        outputs.sort();
        assert_eq!(outputs, vec!["a.cbz", "b.pdf"]);
    }

    #[test]
    fn directory_enumeration_recurses() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("series/volume1");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested.join("ch01.pdf"));
        touch(&dir.path().join("ch00.pdf"));

        let jobs = enumerate_jobs(dir.path(), None, &ConversionOptions::default()).unwrap();
        assert_eq!(jobs.len(), 2);
        // Sibling output: each job writes next to its source.
        assert!(jobs
            .iter()
            .any(|j| j.output_path == nested.join("ch01.cbz")));
    }

    #[test]
    fn output_directory_is_created_and_flattens() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("in/deep");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested.join("x.pdf"));
        touch(&dir.path().join("in/y.zip"));

        let out_dir = dir.path().join("converted");
        assert!(!out_dir.exists());

        let jobs = enumerate_jobs(
            &dir.path().join("in"),
            Some(&out_dir),
            &ConversionOptions::default(),
        )
        .unwrap();

        assert!(out_dir.is_dir(), "output directory must be created");
        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            assert_eq!(job.output_path.parent().unwrap(), out_dir, "flattened");
        }
    }

    #[test]
    fn empty_directory_yields_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("readme.md"));

        let jobs = enumerate_jobs(dir.path(), None, &ConversionOptions::default()).unwrap();
        assert!(jobs.is_empty());
    }
}
