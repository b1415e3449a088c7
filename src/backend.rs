//! Capability traits for the external collaborators the core consumes.
//!
//! The export engine and OCR orchestrator only ever talk to these traits,
//! so tests can substitute in-memory fakes and the CLI can plug in the
//! real implementations from [`crate::pipeline`]:
//!
//! | Trait              | Default implementation                              |
//! |--------------------|-----------------------------------------------------|
//! | [`PdfStructure`]   | [`crate::pipeline::structure::LopdfStructure`]      |
//! | [`Rasterizer`]     | [`crate::pipeline::render::PdfiumRasterizer`]       |
//! | [`TextRecognizer`] | [`crate::pipeline::recognize::TesseractRecognizer`] |
//! | [`DocumentWriter`] | [`crate::pipeline::docx::DocxWriter`]               |
//!
//! All traits are `Send + Sync` so an engine can be moved onto a blocking
//! thread by [`crate::output::export_async`].

use crate::error::{PageError, PagesError, RecognitionError};
use crate::output::MediaKind;
use crate::pipeline::watermark::OverlayPage;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter, used when a page carries no usable `MediaBox`.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

/// Structural access to a PDF: page tree, text layer, page copy and merge.
pub trait PdfStructure: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, pdf: &[u8]) -> Result<usize, PagesError>;

    /// Embedded text of one page (0-based index).
    fn extract_text(&self, pdf: &[u8], page_index: usize) -> Result<String, PageError>;

    /// Embedded text of several pages, one result per requested index.
    ///
    /// The default calls [`PdfStructure::extract_text`] per page;
    /// implementations that parse the document once should override it.
    fn extract_texts(&self, pdf: &[u8], page_indices: &[usize]) -> Vec<Result<String, PageError>> {
        page_indices
            .iter()
            .map(|&i| self.extract_text(pdf, i))
            .collect()
    }

    /// A new document holding structural copies of the given pages, in the
    /// given order.
    fn copy_pages(&self, pdf: &[u8], page_indices: &[usize]) -> Result<Vec<u8>, PagesError>;

    /// Size of one page (0-based index).
    fn page_size(&self, pdf: &[u8], page_index: usize) -> Result<PageSize, PagesError>;

    /// Composite `overlay` on top of every page of `pdf`.
    fn merge_overlay(&self, pdf: &[u8], overlay: &OverlayPage) -> Result<Vec<u8>, PagesError>;
}

/// Turns a whole PDF into one bitmap per page, in document order.
///
/// Fails wholesale: there is no partial-result contract.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, PagesError>;
}

/// Recognises the text in a bitmap.
///
/// `language` is recogniser-specific (e.g. tesseract's `ell+eng`). Calls may
/// fail individually; isolating those failures is the caller's job.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, RecognitionError>;
}

/// Serialises a titled sequence of lines into a text document.
pub trait DocumentWriter: Send + Sync {
    fn serialize(&self, title: &str, lines: &[String]) -> Result<Vec<u8>, PagesError>;

    /// File extension without the dot, e.g. `docx`.
    fn extension(&self) -> &'static str;

    fn media_kind(&self) -> MediaKind;
}
