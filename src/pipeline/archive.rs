//! In-memory ZIP bundles for the per-page and image exports.

use crate::error::PagesError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds one deflate-compressed archive in memory.
///
/// Entries keep insertion order. Nothing is produced unless
/// [`ZipBundle::finish`] succeeds, so a failing export never leaves a partial
/// archive behind.
pub struct ZipBundle {
    name: String,
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ZipBundle {
    /// `name` is the archive's own file name, used in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    pub fn add(&mut self, entry: &str, bytes: &[u8]) -> Result<(), PagesError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(entry, options)
            .map_err(|e| self.error(format!("cannot start entry '{entry}': {e}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| self.error(format!("cannot write entry '{entry}': {e}")))?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn finish(self) -> Result<Vec<u8>, PagesError> {
        let name = self.name;
        self.writer
            .finish()
            .map(Cursor::into_inner)
            .map_err(|e| PagesError::Archive {
                name,
                detail: e.to_string(),
            })
    }

    fn error(&self, detail: String) -> PagesError {
        PagesError::Archive {
            name: self.name.clone(),
            detail,
        }
    }
}
