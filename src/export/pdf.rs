//! Structural PDF exports: the trimmed document and the per-page bundle.

use super::{ExportEngine, ExportRequest};
use crate::error::PagesError;
use crate::output::{ExportArtifact, MediaKind};
use crate::pipeline::archive::ZipBundle;
use crate::pipeline::watermark;
use tracing::{debug, info};

impl ExportEngine {
    /// One PDF holding exactly the ordered pages, optionally watermarked.
    ///
    /// The watermark overlay is synthesised once, at the size of the first
    /// output page, and merged onto every page.
    pub fn trimmed_pdf(&self, request: &ExportRequest) -> Result<ExportArtifact, PagesError> {
        request.ensure_selection()?;
        let document = request.document();
        let order = request.order();

        let mut bytes = self.structure.copy_pages(document.bytes(), order)?;

        if let Some(text) = self.config.watermark_text() {
            let size = self.structure.page_size(&bytes, 0)?;
            let overlay = watermark::synthesize(text, size)?;
            bytes = self.structure.merge_overlay(&bytes, &overlay)?;
            debug!(watermark = text, width = size.width, height = size.height, "Watermark applied");
        }

        info!(
            document = document.name(),
            pages = order.len(),
            bytes = bytes.len(),
            "Trimmed PDF built"
        );
        Ok(ExportArtifact::new(
            format!("{}.pdf", document.base_name()),
            bytes,
            MediaKind::Pdf,
        ))
    }

    /// A ZIP of single-page PDFs, one per selected page in ascending page
    /// order. The export order does not apply to bundle entries.
    pub fn page_bundle(&self, request: &ExportRequest) -> Result<ExportArtifact, PagesError> {
        request.ensure_selection()?;
        let document = request.document();
        let base = document.base_name();
        let prefix = &self.config.filename_prefix;

        let mut bundle = ZipBundle::new(format!("{base}_pages.zip"));
        for &index in request.selected() {
            let page = self.structure.copy_pages(document.bytes(), &[index])?;
            bundle.add(&format!("{prefix}{base}_page_{}.pdf", index + 1), &page)?;
        }

        let entries = bundle.len();
        let bytes = bundle.finish()?;
        info!(document = document.name(), entries, "Page bundle built");
        Ok(ExportArtifact::new(
            format!("{base}_pages.zip"),
            bytes,
            MediaKind::Zip,
        ))
    }
}
