//! The export engine: one artifact per (document, selection, order, target).
//!
//! ```text
//!                       ┌─▶ trimmed_pdf            copy_pages(order) [+ overlay]
//!                       ├─▶ page_bundle            copy_pages([i]) per selected page
//! ExportRequest ──▶ export ─▶ image_bundle         rasterize(all) → PNG per selected page
//!                       ├─▶ ocr_document           OcrOrchestrator(order) → writer
//!                       └─▶ embedded_text_document extract_texts(order) → writer
//! ```
//!
//! Every target requires at least one selected page and never modifies the
//! document bytes. Bundles follow ascending page order; every other target
//! follows the export order.

pub mod images;
pub mod pdf;
pub mod text;

use crate::backend::{DocumentWriter, PdfStructure, Rasterizer, TextRecognizer};
use crate::config::ExportConfig;
use crate::document::Document;
use crate::error::PagesError;
use crate::ocr::OcrOrchestrator;
use crate::output::ExportArtifact;
use crate::pipeline::docx::DocxWriter;
use crate::pipeline::recognize::TesseractRecognizer;
use crate::pipeline::render::PdfiumRasterizer;
use crate::pipeline::structure::LopdfStructure;
use crate::selection::{OrderList, SelectionSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// The five output kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    TrimmedPdf,
    PageBundle,
    ImageBundle,
    OcrDocument,
    EmbeddedTextDocument,
}

impl ExportTarget {
    pub const ALL: [ExportTarget; 5] = [
        ExportTarget::TrimmedPdf,
        ExportTarget::PageBundle,
        ExportTarget::ImageBundle,
        ExportTarget::OcrDocument,
        ExportTarget::EmbeddedTextDocument,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportTarget::TrimmedPdf => "trimmed-pdf",
            ExportTarget::PageBundle => "page-bundle",
            ExportTarget::ImageBundle => "image-bundle",
            ExportTarget::OcrDocument => "ocr-doc",
            ExportTarget::EmbeddedTextDocument => "text-doc",
        }
    }

    /// Whether the target needs the rasteriser.
    pub fn needs_raster(self) -> bool {
        matches!(self, ExportTarget::ImageBundle | ExportTarget::OcrDocument)
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one document's selection and export order.
///
/// Owned and cheap to clone, so it can move onto a blocking thread.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    document: Document,
    selected: Vec<usize>,
    order: Vec<usize>,
}

impl ExportRequest {
    pub fn new(document: &Document, selection: &SelectionSet, order: &OrderList) -> Self {
        Self {
            document: document.clone(),
            selected: selection.selected_indices(),
            order: order.effective(selection),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Selected 0-based page indices, ascending.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Selected 0-based page indices in export order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn ensure_selection(&self) -> Result<(), PagesError> {
        if self.selected.is_empty() {
            return Err(PagesError::EmptySelection {
                document: self.document.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Produces [`ExportArtifact`]s through the collaborator traits.
pub struct ExportEngine {
    structure: Arc<dyn PdfStructure>,
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    writer: Arc<dyn DocumentWriter>,
    config: ExportConfig,
}

impl ExportEngine {
    /// An engine over lopdf, pdfium, tesseract and the DOCX writer.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            structure: Arc::new(LopdfStructure::new()),
            rasterizer: Arc::new(PdfiumRasterizer::new(
                config.pdfium_library.clone(),
                config.max_rendered_pixels,
            )),
            recognizer: Arc::new(TesseractRecognizer::new(config.tesseract_path.clone())),
            writer: Arc::new(DocxWriter),
            config,
        }
    }

    pub fn with_structure(mut self, structure: Arc<dyn PdfStructure>) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The structure collaborator, e.g. for [`Document::load`].
    pub fn structure(&self) -> &dyn PdfStructure {
        self.structure.as_ref()
    }

    /// Produce the artifact for `target`.
    #[instrument(skip_all, fields(document = request.document().name(), %target))]
    pub fn export(
        &self,
        request: &ExportRequest,
        target: ExportTarget,
    ) -> Result<ExportArtifact, PagesError> {
        match target {
            ExportTarget::TrimmedPdf => self.trimmed_pdf(request),
            ExportTarget::PageBundle => self.page_bundle(request),
            ExportTarget::ImageBundle => self.image_bundle(request),
            ExportTarget::OcrDocument => self.ocr_document(request),
            ExportTarget::EmbeddedTextDocument => self.embedded_text_document(request),
        }
    }

    fn orchestrator(&self) -> OcrOrchestrator {
        OcrOrchestrator::new(
            self.rasterizer.clone(),
            self.recognizer.clone(),
            self.config.ocr_dpi,
            self.config.ocr_language.clone(),
        )
        .with_callback(self.config.progress_callback.clone())
    }
}
