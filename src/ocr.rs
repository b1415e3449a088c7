//! OCR orchestration with per-page failure isolation.
//!
//! ```text
//!  Idle ──▶ Rasterizing ──▶ Recognizing(1 of n) ──▶ … ──▶ Recognizing(n of n) ──▶ Done
//!               │
//!               └──▶ Failed   (no bitmaps: nothing is recognised)
//! ```
//!
//! The whole document is rasterised once at OCR DPI. Pages are then
//! recognised in export order; a page whose recognition fails, or that has
//! no bitmap, contributes an empty string and is recorded as degraded. The
//! loop never aborts and never retries, so the same inputs always produce
//! the same text.

use crate::backend::{Rasterizer, TextRecognizer};
use crate::document::Document;
use crate::error::{PageError, PagesError};
use crate::export::text::divided_text;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where an OCR run currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OcrState {
    Idle,
    Rasterizing,
    /// Recognising the page at 1-based `position` of `of` pages.
    Recognizing { position: usize, of: usize },
    Done,
    /// Terminal; only reachable from [`OcrState::Rasterizing`].
    Failed { reason: String },
}

/// Recognised text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number in the source document.
    pub page_number: usize,
    /// Empty when the page degraded.
    pub text: String,
    pub degraded: Option<PageError>,
}

/// Result of a completed OCR run, pages in export order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOutcome {
    pub pages: Vec<PageText>,
}

impl OcrOutcome {
    /// All pages joined with `--- PAGE n ---` dividers.
    pub fn text(&self) -> String {
        divided_text(self.pages.iter().map(|p| (p.page_number, p.text.as_str())))
    }

    /// Errors of the pages that yielded empty text.
    pub fn degraded(&self) -> Vec<&PageError> {
        self.pages.iter().filter_map(|p| p.degraded.as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Progress after the page at 0-based position `k` of `n`.
///
/// Integer arithmetic, so the last page always reports exactly 100.
pub fn progress_percent(k: usize, n: usize) -> u8 {
    if n == 0 {
        return 100;
    }
    (((k + 1) * 100) / n).min(100) as u8
}

/// Drives one OCR run. Create one per run; the state is observable through
/// [`OcrOrchestrator::state`] and the progress callback.
pub struct OcrOrchestrator {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    dpi: u32,
    language: String,
    callback: ProgressCallback,
    state: OcrState,
}

impl OcrOrchestrator {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
        dpi: u32,
        language: impl Into<String>,
    ) -> Self {
        Self {
            rasterizer,
            recognizer,
            dpi,
            language: language.into(),
            callback: Arc::new(NoopProgressCallback),
            state: OcrState::Idle,
        }
    }

    pub fn with_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        if let Some(cb) = callback {
            self.callback = cb;
        }
        self
    }

    pub fn state(&self) -> &OcrState {
        &self.state
    }

    fn transition(&mut self, state: OcrState) {
        debug!(?state, "OCR state");
        self.callback.on_state(&state);
        self.state = state;
    }

    /// Recognise the pages at `order` (0-based indices, export order).
    ///
    /// # Errors
    /// * [`PagesError::EmptySelection`] when `order` is empty; the state stays
    ///   [`OcrState::Idle`].
    /// * [`PagesError::RasterUnavailable`] when rasterisation fails or yields
    ///   no bitmaps; the state becomes [`OcrState::Failed`].
    ///
    /// Recognition failures never produce an error.
    pub fn run(&mut self, document: &Document, order: &[usize]) -> Result<OcrOutcome, PagesError> {
        if order.is_empty() {
            return Err(PagesError::EmptySelection {
                document: document.name().to_string(),
            });
        }

        let total = order.len();
        info!(document = document.name(), pages = total, dpi = self.dpi, lang = %self.language, "Starting OCR");
        self.callback.on_ocr_start(total);

        self.transition(OcrState::Rasterizing);
        let images = match self.rasterizer.rasterize(document.bytes(), self.dpi) {
            Ok(images) if !images.is_empty() => images,
            Ok(_) => {
                return Err(self.fail("rasteriser returned no images".to_string()));
            }
            Err(PagesError::RasterUnavailable { detail }) => return Err(self.fail(detail)),
            Err(other) => return Err(self.fail(other.to_string())),
        };
        debug!(images = images.len(), "Rasterised for OCR");

        let mut pages = Vec::with_capacity(total);
        for (k, &index) in order.iter().enumerate() {
            let page_number = index + 1;
            let position = k + 1;
            self.transition(OcrState::Recognizing {
                position,
                of: total,
            });

            let result = match images.get(index) {
                Some(image) => self
                    .recognizer
                    .recognize(image, &self.language)
                    .map_err(|e| PageError::RecognitionFailed {
                        page: page_number,
                        detail: e.to_string(),
                    }),
                None => Err(PageError::ImageMissing {
                    page: page_number,
                    available: images.len(),
                }),
            };

            let page = match result {
                Ok(text) => {
                    self.callback.on_page_complete(page_number, position, text.len());
                    PageText {
                        page_number,
                        text,
                        degraded: None,
                    }
                }
                Err(err) => {
                    warn!("{}", err);
                    self.callback
                        .on_page_error(page_number, position, &err.to_string());
                    PageText {
                        page_number,
                        text: String::new(),
                        degraded: Some(err),
                    }
                }
            };
            pages.push(page);
            self.callback.on_progress(progress_percent(k, total));
        }

        let outcome = OcrOutcome { pages };
        let degraded = outcome.degraded().len();
        self.transition(OcrState::Done);
        self.callback.on_ocr_complete(total, degraded);
        info!(pages = total, degraded, "OCR complete");
        Ok(outcome)
    }

    fn fail(&mut self, reason: String) -> PagesError {
        warn!(reason = %reason, "OCR aborted: no page images");
        self.transition(OcrState::Failed {
            reason: reason.clone(),
        });
        PagesError::RasterUnavailable { detail: reason }
    }
}
