//! # edgequake-pdfpages
//!
//! Choose which pages of a PDF survive, put them in order, and export them:
//! a trimmed PDF, a ZIP of single-page PDFs, a ZIP of page images, or a text
//! document built from OCR or from the embedded text layer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input      local file, folder scan or URL download
//!  ├─ 2. Document   page count + content-derived key
//!  ├─ 3. Session    selection set (quick ranges, toggles) + export order
//!  ├─ 4. Export     trimmed-pdf │ page-bundle │ image-bundle │ ocr-doc │ text-doc
//!  │                      OCR: rasterise once → recognise per page, failures isolated
//!  └─ 5. Output     artifact written to the output folder (overwrite)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfpages::{
//!     write_artifact, Document, ExportConfig, ExportEngine, ExportTarget, Session,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ExportEngine::new(ExportConfig::builder().watermark("DRAFT").build()?);
//!     let bytes = std::fs::read("report.pdf")?;
//!     let document = Document::load("report.pdf", bytes, engine.structure())?;
//!
//!     let mut session = Session::new();
//!     session.open(&document);
//!     session.apply_quick_range(&document, "1-10,-4")?;
//!     session.propose_order(&document, &[9, 0, 1, 2, 4, 5, 6, 7, 8])?;
//!
//!     let request = session.request(&document)?;
//!     let artifact = engine.export(&request, ExportTarget::TrimmedPdf)?;
//!     write_artifact("out".as_ref(), &artifact)?;
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! | Target            | Needs                                      |
//! |-------------------|--------------------------------------------|
//! | `trimmed-pdf`     | nothing                                    |
//! | `page-bundle`     | nothing                                    |
//! | `text-doc`        | nothing                                    |
//! | `image-bundle`    | pdfium shared library (`PDFIUM_LIB_PATH`)  |
//! | `ocr-doc`         | pdfium and the `tesseract` binary          |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfpages` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod selection;
pub mod session;
pub mod settings;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{DocumentWriter, PageSize, PdfStructure, Rasterizer, TextRecognizer};
pub use batch::{export_stream, ArtifactStream};
pub use config::{ExportConfig, ExportConfigBuilder};
pub use document::{Document, DocumentKey};
pub use error::{PageError, PagesError, RecognitionError};
pub use export::text::{ocr_preview, page_snippet};
pub use export::{ExportEngine, ExportRequest, ExportTarget};
pub use ocr::{OcrOrchestrator, OcrOutcome, OcrState, PageText};
pub use output::{export_async, write_artifact, write_artifact_async, ExportArtifact, MediaKind};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
pub use search::{search, TermMatches};
pub use selection::{OrderList, SelectionSet};
pub use session::{DocumentState, Session};
pub use settings::Settings;
