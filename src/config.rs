//! Configuration types for page exports and OCR runs.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. The core never reads persisted settings itself:
//! the host application (the `pdfpages` binary, or any other caller) maps its
//! stored preferences onto this struct at call time.

use crate::error::PagesError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 600;
pub const DEFAULT_THUMBNAIL_DPI: u32 = 100;
pub const DEFAULT_IMAGE_DPI: u32 = 200;
pub const DEFAULT_OCR_DPI: u32 = 300;
pub const DEFAULT_MAX_RENDERED_PIXELS: u32 = 8000;
pub const DEFAULT_OCR_LANGUAGE: &str = "ell+eng";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Configuration for exports and OCR.
///
/// # Example
/// ```rust
/// use edgequake_pdfpages::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .image_dpi(150)
///     .ocr_language("eng")
///     .watermark("DRAFT")
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_dpi, 300);
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// DPI for preview thumbnails. Range: 72–600. Default: 100.
    pub thumbnail_dpi: u32,

    /// DPI for the image-bundle export. Range: 72–600. Default: 200.
    pub image_dpi: u32,

    /// DPI for rasterising pages before recognition. Range: 72–600. Default: 300.
    ///
    /// Recognition accuracy drops sharply below ~250 DPI on body text, so this
    /// is kept separate from (and usually higher than) the image DPI.
    pub ocr_dpi: u32,

    /// Maximum rendered bitmap dimension (width or height) in pixels. Default: 8000.
    pub max_rendered_pixels: u32,

    /// Recogniser language spec, e.g. `"ell+eng"`. Default: `"ell+eng"`.
    pub ocr_language: String,

    /// Tesseract binary: a path or a name on `PATH`. Default: `"tesseract"`.
    pub tesseract_path: String,

    /// pdfium shared library (file or directory). Default: `PDFIUM_LIB_PATH`
    /// or the system search path.
    pub pdfium_library: Option<PathBuf>,

    /// Watermark text composited onto every page of a trimmed PDF. Default: none.
    pub watermark: Option<String>,

    /// Prepended to every entry name inside bundle archives. Default: empty.
    pub filename_prefix: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional OCR progress observer. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            thumbnail_dpi: DEFAULT_THUMBNAIL_DPI,
            image_dpi: DEFAULT_IMAGE_DPI,
            ocr_dpi: DEFAULT_OCR_DPI,
            max_rendered_pixels: DEFAULT_MAX_RENDERED_PIXELS,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            tesseract_path: crate::pipeline::recognize::DEFAULT_TESSERACT.to_string(),
            pdfium_library: None,
            watermark: None,
            filename_prefix: String::new(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("thumbnail_dpi", &self.thumbnail_dpi)
            .field("image_dpi", &self.image_dpi)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_path", &self.tesseract_path)
            .field("pdfium_library", &self.pdfium_library)
            .field("watermark", &self.watermark)
            .field("filename_prefix", &self.filename_prefix)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn OcrProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The watermark, if set to a non-blank string.
    pub fn watermark_text(&self) -> Option<&str> {
        self.watermark
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn thumbnail_dpi(mut self, dpi: u32) -> Self {
        self.config.thumbnail_dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn image_dpi(mut self, dpi: u32) -> Self {
        self.config.image_dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn watermark(mut self, text: impl Into<String>) -> Self {
        self.config.watermark = Some(text.into());
        self
    }

    pub fn filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.filename_prefix = prefix.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, PagesError> {
        let c = &self.config;
        for (name, dpi) in [
            ("thumbnail", c.thumbnail_dpi),
            ("image", c.image_dpi),
            ("OCR", c.ocr_dpi),
        ] {
            if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
                return Err(PagesError::InvalidConfig(format!(
                    "{name} DPI must be {MIN_DPI}–{MAX_DPI}, got {dpi}"
                )));
            }
        }
        if c.ocr_language.trim().is_empty() {
            return Err(PagesError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.tesseract_path.trim().is_empty() {
            return Err(PagesError::InvalidConfig(
                "Tesseract path must not be empty".into(),
            ));
        }
        if c.filename_prefix.contains(['/', '\\']) {
            return Err(PagesError::InvalidConfig(format!(
                "Filename prefix must not contain path separators, got '{}'",
                c.filename_prefix
            )));
        }
        Ok(self.config)
    }
}
