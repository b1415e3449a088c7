//! Progress-callback trait for OCR runs.
//!
//! Inject an [`Arc<dyn OcrProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive events
//! as the orchestrator moves through its states and recognises each page.
//! Events are delivered synchronously from inside the OCR loop, in order.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfpages::{ExportConfig, OcrProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! struct PercentLog(Mutex<Vec<u8>>);
//!
//! impl OcrProgressCallback for PercentLog {
//!     fn on_progress(&self, percent: u8) {
//!         self.0.lock().unwrap().push(percent);
//!     }
//! }
//!
//! let log = Arc::new(PercentLog(Mutex::new(Vec::new())));
//! let config = ExportConfig::builder()
//!     .progress_callback(log as Arc<dyn OcrProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::ocr::OcrState;
use std::sync::Arc;

/// Called by the OCR orchestrator as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait OcrProgressCallback: Send + Sync {
    /// Called once before rasterisation.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be recognised
    fn on_ocr_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called on every state transition, including each
    /// [`OcrState::Recognizing`] step.
    fn on_state(&self, state: &OcrState) {
        let _ = state;
    }

    /// Called when a page was recognised.
    ///
    /// # Arguments
    /// * `page_num`  — 1-indexed page number in the document
    /// * `position`  — 1-indexed position in the export order
    /// * `text_len`  — byte length of the recognised text
    fn on_page_complete(&self, page_num: usize, position: usize, text_len: usize) {
        let _ = (page_num, position, text_len);
    }

    /// Called when a page degraded to empty text.
    fn on_page_error(&self, page_num: usize, position: usize, error: &str) {
        let _ = (page_num, position, error);
    }

    /// Called after every page with `floor((k + 1) * 100 / n)`.
    fn on_progress(&self, percent: u8) {
        let _ = percent;
    }

    /// Called once after all pages have been attempted.
    ///
    /// # Arguments
    /// * `total_pages` — pages attempted
    /// * `degraded`    — pages that yielded empty text because of an error
    fn on_ocr_complete(&self, total_pages: usize, degraded: usize) {
        let _ = (total_pages, degraded);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        completes: AtomicUsize,
        errors: AtomicUsize,
        last_percent: AtomicUsize,
    }

    impl OcrProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _page_num: usize, _position: usize, _text_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _position: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_progress(&self, percent: u8) {
            self.last_percent.store(percent as usize, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_ocr_start(5);
        cb.on_state(&OcrState::Rasterizing);
        cb.on_page_complete(1, 1, 42);
        cb.on_page_error(2, 2, "some error");
        cb.on_progress(40);
        cb.on_ocr_complete(5, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_complete(3, 1, 100);
        tracker.on_progress(50);
        tracker.on_page_error(1, 2, "tesseract crashed");
        tracker.on_progress(100);

        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.last_percent.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_ocr_start(10);
        cb.on_state(&OcrState::Done);
    }
}
