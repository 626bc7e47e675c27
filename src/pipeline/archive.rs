//! CBZ archives: writing page images into a zip, and reading them back.
//!
//! A CBZ is an ordinary zip archive whose entries are page images in
//! lexicographic name order. Entries are written `Stored` rather than
//! `Deflated` — PNG and WebP are already compressed, and deflating them
//! again burns CPU for a fraction of a percent.
//!
//! Entry names are zero-padded (`page_0001.webp`) so readers that sort
//! names as plain strings keep the pages in order past page 9.

use crate::config::ImageFormat;
use crate::error::ConversionError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Extensions accepted as page images when reading an archive. Matches
/// the decoders compiled into the `image` dependency.
const PAGE_EXTENSIONS: [&str; 4] = ["png", "webp", "jpg", "jpeg"];

/// Incremental CBZ writer: pages go straight from the encoder into the
/// zip, one at a time.
pub struct CbzWriter {
    zip: ZipWriter<File>,
    path: PathBuf,
    pages: usize,
}

impl CbzWriter {
    /// Create the output archive, truncating any existing file.
    pub fn create(path: &Path) -> Result<Self, ConversionError> {
        let file = File::create(path).map_err(|e| ConversionError::WriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            zip: ZipWriter::new(file),
            path: path.to_path_buf(),
            pages: 0,
        })
    }

    /// Append one encoded page image as `page_NNNN.<ext>`.
    pub fn add_page(
        &mut self,
        page_num: usize,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<(), ConversionError> {
        let name = format!("page_{page_num:04}.{}", format.extension());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        self.zip
            .start_file(name.as_str(), options)
            .and_then(|_| self.zip.write_all(bytes).map_err(Into::into))
            .map_err(|e| ConversionError::WriteFailed {
                path: self.path.clone(),
                detail: format!("entry '{name}': {e}"),
            })?;

        self.pages += 1;
        Ok(())
    }

    /// Finalise the zip central directory and flush to disk.
    pub fn finish(mut self) -> Result<usize, ConversionError> {
        self.zip.finish().map_err(|e| ConversionError::WriteFailed {
            path: self.path.clone(),
            detail: e.to_string(),
        })?;
        debug!("wrote {} ({} pages)", self.path.display(), self.pages);
        Ok(self.pages)
    }
}

/// Read the page images out of a CBZ/ZIP archive.
///
/// Entries are filtered to known image extensions (macOS `__MACOSX`
/// resource forks and nested directories are skipped) and returned as
/// `(entry_name, bytes)` in lexicographic name order — the page order a
/// comic reader would use.
///
/// # Errors
/// [`ConversionError::ArchiveFailed`] if the archive cannot be opened,
/// is corrupt, or holds no page images at all.
pub fn read_pages(path: &Path) -> Result<Vec<(String, Vec<u8>)>, ConversionError> {
    let file = File::open(path).map_err(|e| ConversionError::OpenFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| ConversionError::ArchiveFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_page_entry(name))
        .map(String::from)
        .collect();
    names.sort();

    if names.is_empty() {
        return Err(ConversionError::ArchiveFailed {
            path: path.to_path_buf(),
            detail: "no page images found in archive".into(),
        });
    }

    let mut pages = Vec::with_capacity(names.len());
    for name in names {
        let mut entry = archive
            .by_name(&name)
            .map_err(|e| ConversionError::ArchiveFailed {
                path: path.to_path_buf(),
                detail: format!("entry '{name}': {e}"),
            })?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ConversionError::ArchiveFailed {
                path: path.to_path_buf(),
                detail: format!("entry '{name}': {e}"),
            })?;
        pages.push((name, bytes));
    }

    debug!("read {} page(s) from {}", pages.len(), path.display());
    Ok(pages)
}

fn is_page_entry(name: &str) -> bool {
    if name.ends_with('/') || name.starts_with("__MACOSX") {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            PAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_entry_filter() {
        assert!(is_page_entry("page_0001.webp"));
        assert!(is_page_entry("Art/cover.PNG"));
        assert!(!is_page_entry("ComicInfo.xml"));
        assert!(!is_page_entry("__MACOSX/page_0001.webp"));
        assert!(!is_page_entry("pages/"));
        assert!(!is_page_entry("README"));
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cbz");

        let mut writer = CbzWriter::create(&path).unwrap();
        writer.add_page(1, ImageFormat::Webp, b"first").unwrap();
        writer.add_page(2, ImageFormat::Webp, b"second").unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let pages = read_pages(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].0, "page_0001.webp");
        assert_eq!(pages[0].1, b"first");
        assert_eq!(pages[1].0, "page_0002.webp");
    }

    #[test]
    fn entry_names_sort_past_page_nine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.cbz");

        let mut writer = CbzWriter::create(&path).unwrap();
        for page in 1..=12 {
            writer
                .add_page(page, ImageFormat::Png, page.to_string().as_bytes())
                .unwrap();
        }
        writer.finish().unwrap();

        let pages = read_pages(&path).unwrap();
        let names: Vec<_> = pages.iter().map(|(n, _)| n.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[9], "page_0010.png");
    }

    #[test]
    fn archive_without_images_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.zip");

        let file = File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("ComicInfo.xml", FileOptions::default())
            .unwrap();
        zip.write_all(b"<ComicInfo/>").unwrap();
        zip.finish().unwrap();

        let err = read_pages(&path).unwrap_err();
        assert!(matches!(err, ConversionError::ArchiveFailed { .. }));
    }

    #[test]
    fn missing_archive_is_open_failed() {
        let err = read_pages(Path::new("/no/such/file.cbz")).unwrap_err();
        assert!(matches!(err, ConversionError::OpenFailed { .. }));
    }
}
