//! Export artifacts and writing them to the output folder.
//!
//! Writes go straight to the final path and overwrite any file of the same
//! name: there is no temp file, rename or versioning suffix, so re-running an
//! export replaces the previous artifact.

use crate::error::PagesError;
use crate::export::{ExportEngine, ExportRequest, ExportTarget};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Characters allowed in artifact names; everything else becomes `_`.
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_\-\. ]").unwrap());

/// The kind of bytes an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Pdf,
    Zip,
    Docx,
    Text,
    Png,
}

impl MediaKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaKind::Pdf => "application/pdf",
            MediaKind::Zip => "application/zip",
            MediaKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            MediaKind::Text => "text/plain; charset=utf-8",
            MediaKind::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Pdf => "pdf",
            MediaKind::Zip => "zip",
            MediaKind::Docx => "docx",
            MediaKind::Text => "txt",
            MediaKind::Png => "png",
        }
    }
}

/// One produced output: suggested file name, content and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub media_kind: MediaKind,
}

impl ExportArtifact {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, media_kind: MediaKind) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            media_kind,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Replace every character that is not a letter, digit, `_`, `-`, `.` or
/// space with `_`. Letters and digits from any script are kept.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    if cleaned.trim().is_empty() {
        "document".to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Write `artifact` into `dir`, creating the directory if needed.
///
/// Returns the full path written.
pub fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf, PagesError> {
    let path = dir.join(&artifact.filename);
    std::fs::create_dir_all(dir).map_err(|e| PagesError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    std::fs::write(&path, &artifact.bytes).map_err(|e| PagesError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), bytes = artifact.len(), "Artifact written");
    Ok(path)
}

/// Async variant of [`write_artifact`].
pub async fn write_artifact_async(
    dir: &Path,
    artifact: &ExportArtifact,
) -> Result<PathBuf, PagesError> {
    let path = dir.join(&artifact.filename);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PagesError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .map_err(|e| PagesError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;
    info!(path = %path.display(), bytes = artifact.len(), "Artifact written");
    Ok(path)
}

/// Run one export on the blocking thread pool.
///
/// PDF parsing, rasterisation and recognition are CPU-bound or spawn
/// processes, so they must not run on a Tokio worker thread.
pub async fn export_async(
    engine: Arc<ExportEngine>,
    request: ExportRequest,
    target: ExportTarget,
) -> Result<ExportArtifact, PagesError> {
    tokio::task::spawn_blocking(move || engine.export(&request, target))
        .await
        .map_err(|e| PagesError::Internal(format!("Export task panicked: {}", e)))?
}
