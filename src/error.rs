//! Error types for the edgequake-pdfpages library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PagesError`] — **Hard**: the operation produced nothing (malformed
//!   quick-range, rejected order, empty selection, rasteriser unavailable,
//!   unwritable destination). Selection and order state is left untouched
//!   whenever one of these is returned.
//!
//! * [`PageError`] — **Soft**: a single page degraded (recognition failed,
//!   no bitmap for the page, text layer unreadable). The page contributes an
//!   empty string and the batch continues; the error is recorded in the
//!   outcome so callers can report which pages degraded.
//!
//! * [`RecognitionError`] — what a [`crate::backend::TextRecognizer`]
//!   returns for one bitmap. The OCR orchestrator turns it into a
//!   [`PageError`].

use std::path::PathBuf;
use thiserror::Error;

/// All hard errors returned by the edgequake-pdfpages library.
#[derive(Debug, Error)]
pub enum PagesError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// A quick-range token is not well formed. No token of the expression
    /// was applied.
    #[error("Invalid quick-range token '{token}': {reason}")]
    Parse { token: String, reason: String },

    /// A proposed order is not a permutation of the selected pages.
    #[error("New order must include exactly the selected pages (expected {expected} pages, got {got})")]
    OrderValidation { expected: usize, got: usize },

    /// An export was attempted with no page selected.
    #[error("No pages selected in '{document}'")]
    EmptySelection { document: String },

    /// A page index outside the document was addressed directly.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The document is not known to the session.
    #[error("Document '{document}' has not been opened in this session")]
    UnknownDocument { document: String },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The rasteriser produced no bitmaps. Image-bundle and OCR exports
    /// abort without a partial artifact.
    #[error("Cannot obtain page images: {detail}")]
    RasterUnavailable { detail: String },

    /// The PDF structure could not be read or rebuilt.
    #[error("PDF structure is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { detail: String },

    /// Building a ZIP bundle failed.
    #[error("Failed to build archive '{name}': {detail}")]
    Archive { name: String, detail: String },

    /// Serialising a text document failed.
    #[error("Failed to serialise document '{title}': {detail}")]
    DocumentWrite { title: String, detail: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or folder was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{name}'\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// An input folder contains no PDF files.
    #[error("No PDF files found in folder '{path}'")]
    EmptyFolder { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The destination is not writable. No guarantee is made about a
    /// partially written file.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persisted settings could not be saved.
    #[error("Failed to save settings to '{path}': {detail}")]
    Settings { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A soft error for a single page.
///
/// Never propagated past the batch boundary: the page's text becomes the
/// empty string and the error is stored in the run's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The recogniser failed on this page's bitmap.
    #[error("Page {page}: text recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// The rasterised set has no bitmap for this page.
    #[error("Page {page}: no rasterised image (only {available} images available)")]
    ImageMissing { page: usize, available: usize },

    /// The embedded text layer of this page could not be read.
    #[error("Page {page}: embedded text extraction failed: {detail}")]
    TextExtractionFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RecognitionFailed { page, .. }
            | PageError::ImageMissing { page, .. }
            | PageError::TextExtractionFailed { page, .. } => *page,
        }
    }
}

/// Failure of a single call to a text-recognition collaborator.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The recogniser binary could not be started.
    #[error("failed to run '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The recogniser ran but reported failure.
    #[error("recogniser exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    /// The bitmap could not be encoded for the recogniser.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Temporary-file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other recogniser-specific failure.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_token() {
        let e = PagesError::Parse {
            token: "3-x".into(),
            reason: "'x' is not a page number".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3-x"), "got: {msg}");
    }

    #[test]
    fn order_validation_display() {
        let e = PagesError::OrderValidation {
            expected: 4,
            got: 3,
        };
        assert!(e.to_string().contains("expected 4"));
    }

    #[test]
    fn empty_selection_display() {
        let e = PagesError::EmptySelection {
            document: "report.pdf".into(),
        };
        assert!(e.to_string().contains("report.pdf"));
    }

    #[test]
    fn page_error_reports_page_number() {
        let e = PageError::RecognitionFailed {
            page: 7,
            detail: "boom".into(),
        };
        assert_eq!(e.page(), 7);
        assert!(e.to_string().contains("Page 7"));

        let e = PageError::ImageMissing {
            page: 9,
            available: 4,
        };
        assert_eq!(e.page(), 9);
    }

    #[test]
    fn recognition_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: RecognitionError = io.into();
        assert!(e.to_string().contains("gone"));
    }
}
