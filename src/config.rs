//! Configuration types for PDF ↔ CBZ conversion.
//!
//! All conversion behaviour is controlled through [`ConversionOptions`],
//! built via its [`ConversionOptionsBuilder`]. The options are supplied
//! once at startup, embedded read-only into every
//! [`crate::jobs::ConversionJob`], and shared freely across worker
//! threads — keeping every knob in one serialisable struct makes it
//! trivial to log a run's exact configuration and diff two runs.

use crate::error::Pdf2CbzError;
use serde::{Deserialize, Serialize};

/// Target raster format for page images when producing a CBZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG. Larger archives; `quality` is ignored.
    Png,
    /// Lossy WebP at the configured quality. (default)
    #[default]
    Webp,
}

impl ImageFormat {
    /// File extension used for archive entries of this format.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options for a conversion batch.
///
/// Built via [`ConversionOptions::builder()`] or using
/// [`ConversionOptions::default()`].
///
/// # Example
/// ```rust
/// use pdf2cbz::{ConversionOptions, ImageFormat};
///
/// let options = ConversionOptions::builder()
///     .image_format(ImageFormat::Png)
///     .dpi(200)
///     .workers(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Raster format for page images when producing a CBZ. Default: WebP.
    ///
    /// WebP at quality 80 typically shrinks a rendered comic page to a
    /// quarter of its PNG size with no visible artefacts at reading
    /// distance. Choose PNG when archival fidelity matters more than
    /// file size.
    pub image_format: ImageFormat,

    /// Lossy-encode quality, 1–100. Default: 80. Meaningful only for the
    /// WebP path; PNG is always lossless.
    pub quality: u8,

    /// Rasterisation DPI override. Range: 36–600. Default: none (150).
    ///
    /// 150 DPI keeps page images sharp on tablet-sized screens while the
    /// archive stays a sensible size. Raise it for print-resolution
    /// sources; the per-page pixel cap in the render stage still bounds
    /// memory for outsized pages.
    pub dpi: Option<u32>,

    /// Convert rasterised pages to single-channel grayscale before
    /// encoding. Default: false.
    pub grayscale: bool,

    /// Dispatcher worker-pool size. Default: host CPU count.
    ///
    /// Jobs are CPU-bound and independent, so one worker per core is the
    /// sweet spot. Effective parallelism is additionally capped at the
    /// job count by the dispatcher.
    pub workers: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            image_format: ImageFormat::default(),
            quality: 80,
            dpi: None,
            grayscale: false,
            workers: num_cpus::get(),
        }
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.options.image_format = format;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = quality.clamp(1, 100);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = Some(dpi.clamp(36, 600));
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.options.grayscale = v;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.options.workers = n.max(1);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConversionOptions, Pdf2CbzError> {
        let o = &self.options;
        if o.quality < 1 || o.quality > 100 {
            return Err(Pdf2CbzError::InvalidConfig(format!(
                "quality must be 1–100, got {}",
                o.quality
            )));
        }
        if o.workers == 0 {
            return Err(Pdf2CbzError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if let Some(dpi) = o.dpi {
            if !(36..=600).contains(&dpi) {
                return Err(Pdf2CbzError::InvalidConfig(format!(
                    "DPI must be 36–600, got {dpi}"
                )));
            }
        }
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = ConversionOptions::default();
        assert_eq!(o.image_format, ImageFormat::Webp);
        assert_eq!(o.quality, 80);
        assert_eq!(o.dpi, None);
        assert!(!o.grayscale);
        assert!(o.workers >= 1);
    }

    #[test]
    fn builder_clamps_quality() {
        let o = ConversionOptions::builder().quality(0).build().unwrap();
        assert_eq!(o.quality, 1);
        let o = ConversionOptions::builder().quality(200).build().unwrap();
        assert_eq!(o.quality, 100);
    }

    #[test]
    fn builder_clamps_dpi_and_workers() {
        let o = ConversionOptions::builder().dpi(10).workers(0).build().unwrap();
        assert_eq!(o.dpi, Some(36));
        assert_eq!(o.workers, 1);
    }

    #[test]
    fn format_extension() {
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
    }
}
