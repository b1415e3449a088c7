//! Collaborator implementations behind the [`crate::backend`] traits.
//!
//! Each submodule wraps exactly one external capability, so the export
//! engine and OCR orchestrator can be tested against in-memory fakes and
//! a backend can be swapped without touching the core.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ structure ──┬──▶ (trimmed PDF / page bundle / text layer)
//! (path/URL)  (lopdf)   └──▶ watermark overlay merge
//!
//!           render ──▶ recognize ──▶ docx
//!          (pdfium)   (tesseract)   (WordprocessingML / txt)
//!                 └──▶ archive (PNG bundle)
//! ```
//!
//! 1. [`input`]     — read local files, scan folders, download URLs
//! 2. [`structure`] — page count, text layer, page copy, overlay merge
//! 3. [`watermark`] — synthesise the single overlay page
//! 4. [`render`]    — rasterise a whole document at a DPI via pdfium
//! 5. [`recognize`] — run tesseract on one bitmap
//! 6. [`docx`]      — serialise titled lines as `.docx` or `.txt`
//! 7. [`archive`]   — in-memory ZIP bundles

pub mod archive;
pub mod docx;
pub mod input;
pub mod recognize;
pub mod render;
pub mod structure;
pub mod watermark;
