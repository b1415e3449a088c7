//! Image-bundle export and page thumbnails.

use super::{ExportEngine, ExportRequest};
use crate::error::PagesError;
use crate::output::{ExportArtifact, MediaKind};
use crate::pipeline::archive::ZipBundle;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::{info, warn};

impl ExportEngine {
    /// A ZIP of PNGs, one per selected page in ascending page order.
    ///
    /// The whole document is rasterised once and the selection applied
    /// afterwards. If the rasteriser fails or returns nothing, no archive
    /// is produced.
    pub fn image_bundle(&self, request: &ExportRequest) -> Result<ExportArtifact, PagesError> {
        request.ensure_selection()?;
        let document = request.document();
        let base = document.base_name();
        let prefix = &self.config.filename_prefix;
        let archive = format!("{base}_images.zip");

        let images = self.rasterize_selected(request, self.config.image_dpi)?;
        let mut bundle = ZipBundle::new(archive.clone());
        for (index, image) in images {
            let png = encode_png(image, index, &archive)?;
            bundle.add(&format!("{prefix}{base}_page_{}.png", index + 1), &png)?;
        }

        let entries = bundle.len();
        let bytes = bundle.finish()?;
        info!(
            document = document.name(),
            entries,
            dpi = self.config.image_dpi,
            "Image bundle built"
        );
        Ok(ExportArtifact::new(archive, bytes, MediaKind::Zip))
    }

    /// One small PNG per selected page, rendered at the thumbnail DPI.
    ///
    /// Named `<base>_thumb_<n>.png`, in ascending page order.
    pub fn thumbnails(&self, request: &ExportRequest) -> Result<Vec<ExportArtifact>, PagesError> {
        request.ensure_selection()?;
        let base = request.document().base_name();

        let images = self.rasterize_selected(request, self.config.thumbnail_dpi)?;
        let thumbs = images
            .into_iter()
            .map(|(index, image)| {
                let name = format!("{base}_thumb_{}.png", index + 1);
                let png = encode_png(image, index, &name)?;
                Ok(ExportArtifact::new(name, png, MediaKind::Png))
            })
            .collect::<Result<Vec<_>, PagesError>>()?;
        info!(
            document = request.document().name(),
            count = thumbs.len(),
            dpi = self.config.thumbnail_dpi,
            "Thumbnails rendered"
        );
        Ok(thumbs)
    }

    /// Rasterise the whole document at `dpi` and keep the selected pages.
    ///
    /// Selected pages the rasteriser produced no bitmap for are skipped.
    fn rasterize_selected(
        &self,
        request: &ExportRequest,
        dpi: u32,
    ) -> Result<Vec<(usize, DynamicImage)>, PagesError> {
        let mut images: Vec<Option<DynamicImage>> = self
            .rasterizer
            .rasterize(request.document().bytes(), dpi)?
            .into_iter()
            .map(Some)
            .collect();
        if images.is_empty() {
            return Err(PagesError::RasterUnavailable {
                detail: "rasteriser returned no images".into(),
            });
        }

        let available = images.len();
        let mut selected = Vec::with_capacity(request.selected().len());
        for &index in request.selected() {
            match images.get_mut(index).and_then(Option::take) {
                Some(image) => selected.push((index, image)),
                None => warn!(
                    page = index + 1,
                    available,
                    "No rasterised image for selected page, skipping"
                ),
            }
        }
        Ok(selected)
    }
}

fn encode_png(image: DynamicImage, index: usize, artifact: &str) -> Result<Vec<u8>, PagesError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| PagesError::Archive {
            name: artifact.to_string(),
            detail: format!("page {} PNG encoding failed: {e}", index + 1),
        })?;
    Ok(png)
}
