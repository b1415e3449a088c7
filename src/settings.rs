//! Persisted user settings: folders, recogniser binary and OCR language.
//!
//! Stored as pretty JSON at `<config dir>/edgequake-pdfpages/config.json`.
//! The export core never reads this file; the CLI maps it onto an
//! [`ExportConfigBuilder`] and lets command-line flags override it.

use crate::config::{ExportConfigBuilder, DEFAULT_OCR_LANGUAGE};
use crate::error::PagesError;
use crate::pipeline::recognize::DEFAULT_TESSERACT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const APP_DIR: &str = "edgequake-pdfpages";
pub const SETTINGS_FILE: &str = "config.json";

/// Keys accepted by [`Settings::set`].
pub const KEYS: [&str; 4] = ["input_folder", "output_folder", "tesseract_path", "ocr_lang"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_folder: String,
    pub output_folder: String,
    pub tesseract_path: String,
    pub ocr_lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_folder: String::new(),
            output_folder: String::new(),
            tesseract_path: DEFAULT_TESSERACT.to_string(),
            ocr_lang: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

impl Settings {
    /// `<config dir>/edgequake-pdfpages/config.json`, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load settings from `path`.
    ///
    /// Missing keys take their defaults. A missing file is created with
    /// defaults; an unreadable or corrupt file yields defaults and is left
    /// as it is.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt settings file, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    warn!("{}", e);
                }
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PagesError> {
        let err = |detail: String| PagesError::Settings {
            path: path.to_path_buf(),
            detail,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| err(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| err(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| err(e.to_string()))?;
        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Set one key by name.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), PagesError> {
        let value = value.into();
        match key {
            "input_folder" => self.input_folder = value,
            "output_folder" => self.output_folder = value,
            "tesseract_path" => self.tesseract_path = value,
            "ocr_lang" => self.ocr_lang = value,
            other => {
                return Err(PagesError::InvalidConfig(format!(
                    "Unknown settings key '{other}' (expected one of: {})",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// The output folder, if set.
    pub fn output_dir(&self) -> Option<PathBuf> {
        non_blank(&self.output_folder).map(PathBuf::from)
    }

    /// The input folder, if set.
    pub fn input_dir(&self) -> Option<PathBuf> {
        non_blank(&self.input_folder).map(PathBuf::from)
    }

    /// Seed an export config builder with the persisted recogniser settings.
    pub fn apply(&self, builder: ExportConfigBuilder) -> ExportConfigBuilder {
        let mut builder = builder;
        if let Some(path) = non_blank(&self.tesseract_path) {
            builder = builder.tesseract_path(path);
        }
        if let Some(lang) = non_blank(&self.ocr_lang) {
            builder = builder.ocr_language(lang);
        }
        builder
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app/config.json");
        let settings = Settings::load(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(settings.ocr_lang, "ell+eng");
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_folder": "/tmp/out"}"#).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.output_folder, "/tmp/out");
        assert_eq!(settings.tesseract_path, "tesseract");
        assert_eq!(settings.output_dir(), Some(PathBuf::from("/tmp/out")));
        assert_eq!(settings.input_dir(), None);
    }

    #[test]
    fn corrupt_file_yields_defaults_and_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn set_and_save_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut settings = Settings::default();
        settings.set("ocr_lang", "deu").unwrap();
        settings.set("input_folder", "/data/in").unwrap();
        assert!(settings.set("colour", "blue").is_err());
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn apply_seeds_builder() {
        let mut settings = Settings::default();
        settings.set("tesseract_path", "/usr/local/bin/tesseract").unwrap();
        settings.set("ocr_lang", "  ").unwrap();
        let config = settings.apply(ExportConfig::builder()).build().unwrap();
        assert_eq!(config.tesseract_path, "/usr/local/bin/tesseract");
        assert_eq!(config.ocr_language, "ell+eng");
    }
}
