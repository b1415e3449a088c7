//! Text-document exports (OCR and embedded text layer) and the text helpers
//! they share with the preview and listing surfaces.

use super::{ExportEngine, ExportRequest};
use crate::error::PagesError;
use crate::ocr::OcrOutcome;
use crate::output::ExportArtifact;
use tracing::{info, warn};

/// Characters shown by [`ocr_preview`].
pub const PREVIEW_CHARS: usize = 1000;

/// Characters shown by [`page_snippet`].
pub const SNIPPET_CHARS: usize = 180;

/// Join pages as `\n--- PAGE n ---\n<text>\n`, in the given order.
pub fn divided_text<'a>(pages: impl IntoIterator<Item = (usize, &'a str)>) -> String {
    pages
        .into_iter()
        .map(|(page_number, text)| format!("\n--- PAGE {page_number} ---\n{text}\n"))
        .collect()
}

/// Split into lines on every Unicode line boundary (`\n`, `\r\n`, `\r`,
/// vertical tab, form feed, file/group/record separators, NEL, LS, PS).
///
/// A trailing boundary does not produce a trailing empty line; blank lines
/// in between are kept.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}' => lines.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended when cut.
pub fn ocr_preview(text: &str) -> String {
    truncate_chars(text, PREVIEW_CHARS)
}

/// One-line snippet of a page's text for listings: newlines become spaces,
/// cut at [`SNIPPET_CHARS`] characters with `...` appended.
pub fn page_snippet(text: &str) -> String {
    truncate_chars(&text.replace('\n', " "), SNIPPET_CHARS)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl ExportEngine {
    /// Recognise the pages of `request` in export order.
    pub fn ocr(&self, request: &ExportRequest) -> Result<OcrOutcome, PagesError> {
        request.ensure_selection()?;
        self.orchestrator().run(request.document(), request.order())
    }

    /// OCR text document: `--- PAGE n ---` dividers in export order, titled
    /// with the source file name. Pages whose recognition fails are empty.
    pub fn ocr_document(&self, request: &ExportRequest) -> Result<ExportArtifact, PagesError> {
        let outcome = self.ocr(request)?;
        self.text_document(request, &outcome.text())
    }

    /// Embedded text of the pages of `request` in export order, one entry
    /// per page. Unreadable pages degrade to an empty string.
    pub fn embedded_texts(&self, request: &ExportRequest) -> Result<Vec<(usize, String)>, PagesError> {
        request.ensure_selection()?;
        let order = request.order();
        let results = self
            .structure
            .extract_texts(request.document().bytes(), order);

        Ok(order
            .iter()
            .zip(results)
            .map(|(&index, result)| {
                let text = result.unwrap_or_else(|err| {
                    warn!("{}", err);
                    String::new()
                });
                (index + 1, text)
            })
            .collect())
    }

    /// Embedded-text document; same layout as [`ExportEngine::ocr_document`].
    pub fn embedded_text_document(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportArtifact, PagesError> {
        let pages = self.embedded_texts(request)?;
        let text = divided_text(pages.iter().map(|(n, t)| (*n, t.as_str())));
        self.text_document(request, &text)
    }

    fn text_document(&self, request: &ExportRequest, text: &str) -> Result<ExportArtifact, PagesError> {
        let document = request.document();
        let lines = split_lines(text);
        let bytes = self.writer.serialize(document.name(), &lines)?;
        let filename = format!("{}.{}", document.base_name(), self.writer.extension());
        info!(
            document = document.name(),
            pages = request.order().len(),
            lines = lines.len(),
            "Text document built"
        );
        Ok(ExportArtifact::new(filename, bytes, self.writer.media_kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_layout() {
        assert_eq!(
            divided_text([(3, "c"), (1, "")]),
            "\n--- PAGE 3 ---\nc\n\n--- PAGE 1 ---\n\n"
        );
    }

    #[test]
    fn split_lines_on_unicode_boundaries() {
        assert_eq!(split_lines(""), Vec::<String>::new());
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("\na"), vec!["", "a"]);
        assert_eq!(split_lines("a\r\nb\rc\u{0c}d"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\n\nb"), vec!["a", "", "", "b"]);
        assert_eq!(split_lines("x\u{2028}y\u{85}z"), vec!["x", "y", "z"]);
    }

    #[test]
    fn divided_text_lines_start_blank_and_keep_empty_bodies() {
        let lines = split_lines(&divided_text([(1, ""), (2, "hi")]));
        assert_eq!(lines, vec!["", "--- PAGE 1 ---", "", "", "--- PAGE 2 ---", "hi"]);
    }

    #[test]
    fn preview_truncates_on_chars() {
        let short = "αβγ";
        assert_eq!(ocr_preview(short), "αβγ");
        let long = "ω".repeat(PREVIEW_CHARS + 5);
        let preview = ocr_preview(&long);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("ω..."));
        let exact = "x".repeat(PREVIEW_CHARS);
        assert_eq!(ocr_preview(&exact), exact);
    }

    #[test]
    fn snippet_flattens_newlines() {
        assert_eq!(page_snippet("one\ntwo"), "one two");
        let long = "a".repeat(200);
        assert_eq!(page_snippet(&long), format!("{}...", "a".repeat(180)));
    }
}
