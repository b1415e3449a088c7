//! Text recognition through the `tesseract` command-line binary.
//!
//! Each bitmap is written to a temporary PNG and handed to
//! `<binary> <png> stdout -l <language>`; the recognised text is read from
//! stdout. The temp file is removed when the call returns, success or not.

use crate::backend::TextRecognizer;
use crate::error::RecognitionError;
use image::{DynamicImage, ImageFormat};
use std::process::Command;
use tracing::debug;

pub const DEFAULT_TESSERACT: &str = "tesseract";

/// [`TextRecognizer`] that shells out to tesseract.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
}

impl TesseractRecognizer {
    /// `binary` is a path or a name resolved on `PATH`.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Whether the binary can be started at all.
    pub fn is_available(&self) -> bool {
        let ok = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !ok {
            debug!(binary = %self.binary, "tesseract not found - install tesseract-ocr for OCR support");
        }
        ok
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, RecognitionError> {
        let mut file = tempfile::Builder::new()
            .prefix("pdfpages-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(file.as_file_mut(), ImageFormat::Png)?;

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|source| RecognitionError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RecognitionError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), language, "Recognised bitmap");
        Ok(text)
    }
}
