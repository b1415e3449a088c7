//! Immutable source documents and their content-derived identity.

use crate::backend::PdfStructure;
use crate::error::PagesError;
use crate::output::sanitize_filename;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Stable identity of a document within a session.
///
/// SHA-256 over the display name, a zero byte and the raw content, so two
/// different files that share a name never share selection state, and the
/// same file opened twice maps to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn derive(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for logs and listings.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A PDF held in memory for the duration of a session.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    bytes: Arc<[u8]>,
    page_count: usize,
    key: DocumentKey,
}

impl Document {
    /// Parse enough of `bytes` to learn the page count.
    pub fn load(
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        structure: &dyn PdfStructure,
    ) -> Result<Self, PagesError> {
        let name = name.into();
        let bytes = bytes.into();
        let page_count = structure
            .page_count(&bytes)
            .map_err(|e| match e {
                PagesError::CorruptPdf { detail } => PagesError::CorruptPdf {
                    detail: format!("{name}: {detail}"),
                },
                other => other,
            })?;
        let key = DocumentKey::derive(&name, &bytes);
        debug!(name = %name, key = key.short(), page_count, "Document loaded");
        Ok(Self {
            name,
            bytes,
            page_count,
            key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// File stem of the display name, sanitised for use in artifact names.
    pub fn base_name(&self) -> String {
        let stem = match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.name.as_str(),
        };
        sanitize_filename(stem)
    }
}
