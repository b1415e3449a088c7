//! Input resolution: turn a user-supplied path, folder or URL into raw PDFs.
//!
//! Documents are held in memory for the whole session, so a URL is simply
//! downloaded into a buffer and a folder is expanded into every `*.pdf` it
//! contains (sorted by file name). Each source is checked for the `%PDF`
//! magic bytes so callers get a meaningful error rather than a parser crash.

use crate::error::PagesError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One raw document before it is parsed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name, usually the file name.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve one input argument to one or more raw PDFs.
///
/// * URL → downloaded into memory
/// * directory → every `*.pdf` file directly inside it, sorted by name
/// * file → that file
pub async fn resolve_sources(input: &str, timeout_secs: u64) -> Result<Vec<SourceFile>, PagesError> {
    if is_url(input) {
        return Ok(vec![download_url(input, timeout_secs).await?]);
    }

    let path = PathBuf::from(input);
    if path.is_dir() {
        let files = scan_folder(&path)?;
        if files.is_empty() {
            return Err(PagesError::EmptyFolder { path });
        }
        info!(folder = %path.display(), count = files.len(), "Scanned input folder");
        files.iter().map(|file| read_local(file)).collect()
    } else {
        Ok(vec![read_local(&path)?])
    }
}

/// PDF files directly inside `dir`, matched case-insensitively on the
/// extension and sorted by file name.
pub fn scan_folder(dir: &Path) -> Result<Vec<PathBuf>, PagesError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_to_input_error(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_pdf_extension(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Read a local file, validating existence, permission and PDF magic bytes.
pub fn read_local(path: &Path) -> Result<SourceFile, PagesError> {
    if !path.exists() {
        return Err(PagesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| io_to_input_error(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    check_magic(&name, &bytes)?;
    debug!(name = %name, bytes = bytes.len(), "Read local PDF");
    Ok(SourceFile { name, bytes })
}

fn io_to_input_error(path: &Path, err: std::io::Error) -> PagesError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => PagesError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PagesError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}

/// Reject buffers that do not start with `%PDF`.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), PagesError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(PagesError::NotAPdf {
        name: name.to_string(),
        magic,
    })
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<SourceFile, PagesError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PagesError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PagesError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PagesError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PagesError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = filename_from_url(url);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PagesError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    check_magic(&name, &bytes)?;
    info!(name = %name, bytes = bytes.len(), "Downloaded PDF");
    Ok(SourceFile { name, bytes })
}

/// Last path segment of the URL when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
