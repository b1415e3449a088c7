//! PDF rasterisation: every page of a document to a `DynamicImage` via pdfium.
//!
//! ## Binding
//!
//! The pdfium shared library is looked up in this order: the configured
//! library path (file or directory), `PDFIUM_LIB_PATH`, the current
//! directory, and finally the system library search path. A missing library
//! is reported as [`PagesError::RasterUnavailable`] so the image-bundle and
//! OCR exports fail cleanly instead of panicking.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 300 DPI would produce a
//! 14,000 × 20,000 px bitmap. `max_pixels` caps the longest edge regardless
//! of physical size, keeping memory bounded on the whole-document render.

use crate::backend::Rasterizer;
use crate::error::PagesError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the pdfium library file or its directory.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// [`Rasterizer`] backed by `pdfium-render`.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library: Option<PathBuf>,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(library: Option<PathBuf>, max_pixels: u32) -> Self {
        Self {
            library,
            max_pixels,
        }
    }

    /// Whether a pdfium library can be bound in this environment.
    pub fn is_available(&self) -> bool {
        self.bind().is_ok()
    }

    fn bind(&self) -> Result<Pdfium, PagesError> {
        let configured = self
            .library
            .clone()
            .or_else(|| std::env::var_os(PDFIUM_LIB_ENV).map(PathBuf::from));

        let bindings = match configured {
            Some(path) => Pdfium::bind_to_library(library_file(&path)),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| PagesError::RasterUnavailable {
            detail: format!("pdfium library not found: {e:?}"),
        })?;

        Ok(Pdfium::new(bindings))
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new(None, crate::config::DEFAULT_MAX_RENDERED_PIXELS)
    }
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, PagesError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| PagesError::RasterUnavailable {
                detail: format!("pdfium cannot open document: {e:?}"),
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!(pages = total_pages, dpi, "Rasterising document");

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let mut images = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                PagesError::RasterUnavailable {
                    detail: format!("page {} failed to render: {e:?}", idx + 1),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        if images.is_empty() {
            return Err(PagesError::RasterUnavailable {
                detail: "document rendered no pages".into(),
            });
        }
        Ok(images)
    }
}
