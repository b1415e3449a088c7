//! Text-document writers for the OCR and embedded-text exports.
//!
//! [`DocxWriter`] emits the smallest WordprocessingML package Word and
//! LibreOffice accept: content types, the package relationship and
//! `word/document.xml`. The layout is a bold 14pt title, an empty spacer
//! paragraph, then one paragraph per line (empty lines stay empty
//! paragraphs). [`PlainTextWriter`] writes the same structure as `.txt`.

use crate::backend::DocumentWriter;
use crate::error::PagesError;
use crate::output::MediaKind;
use crate::pipeline::archive::ZipBundle;
use quick_xml::escape::escape;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = "<w:sectPr/></w:body></w:document>";

/// Title size in half-points (14pt).
const TITLE_HALF_POINTS: u32 = 28;

/// [`DocumentWriter`] producing `.docx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxWriter;

impl DocumentWriter for DocxWriter {
    fn serialize(&self, title: &str, lines: &[String]) -> Result<Vec<u8>, PagesError> {
        let body = document_xml(title, lines);

        let mut package = ZipBundle::new(format!("{title}.docx"));
        let parts: [(&str, &[u8]); 3] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", PACKAGE_RELS.as_bytes()),
            ("word/document.xml", body.as_bytes()),
        ];
        for (name, bytes) in parts {
            package.add(name, bytes).map_err(|e| write_error(title, e))?;
        }
        package.finish().map_err(|e| write_error(title, e))
    }

    fn extension(&self) -> &'static str {
        "docx"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Docx
    }
}

fn write_error(title: &str, err: PagesError) -> PagesError {
    PagesError::DocumentWrite {
        title: title.to_string(),
        detail: err.to_string(),
    }
}

fn document_xml(title: &str, lines: &[String]) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);
    if !title.is_empty() {
        xml.push_str(&format!(
            r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="{TITLE_HALF_POINTS}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p><w:p/>"#,
            escape_xml(title)
        ));
    }
    for line in lines {
        if line.is_empty() {
            xml.push_str("<w:p/>");
        } else {
            xml.push_str(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(line)
            ));
        }
    }
    xml.push_str(DOCUMENT_CLOSE);
    xml
}

/// Escape markup characters and drop code points XML 1.0 cannot carry
/// (control characters OCR output occasionally contains).
fn escape_xml(text: &str) -> String {
    let carried: String = text
        .chars()
        .filter(|&c| {
            !matches!(
                c,
                '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
            )
        })
        .collect();
    escape(carried.as_str()).into_owned()
}

/// [`DocumentWriter`] producing UTF-8 `.txt` with the same layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextWriter;

impl DocumentWriter for PlainTextWriter {
    fn serialize(&self, title: &str, lines: &[String]) -> Result<Vec<u8>, PagesError> {
        let mut out = String::new();
        if !title.is_empty() {
            out.push_str(title);
            out.push_str("\n\n");
        }
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn document_part(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert!(archive.by_name("_rels/.rels").is_ok());
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn docx_has_bold_title_and_one_paragraph_per_line() {
        let bytes = DocxWriter
            .serialize("scan.pdf", &lines(&["", "--- PAGE 1 ---", "a < b", ""]))
            .unwrap();
        let xml = document_part(bytes);

        assert!(xml.contains(r#"<w:b/><w:sz w:val="28"/>"#));
        assert!(xml.contains(">scan.pdf</w:t>"));
        assert!(xml.contains(">a &lt; b</w:t>"));
        // spacer + two empty lines
        assert_eq!(xml.matches("<w:p/>").count(), 3);
        // title + spacer + four lines
        assert_eq!(xml.matches("<w:p>").count() + xml.matches("<w:p/>").count(), 6);
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(escape_xml("a\u{0}b\u{1b}c\td"), "abc\td");
        assert_eq!(escape_xml("\"x\" & 'y'"), "&quot;x&quot; &amp; &apos;y&apos;");
    }

    #[test]
    fn untitled_docx_has_no_title_paragraph() {
        let xml = document_part(DocxWriter.serialize("", &lines(&["only"])).unwrap());
        assert!(!xml.contains("<w:b/>"));
        assert_eq!(xml.matches("<w:p>").count(), 1);
    }

    #[test]
    fn plain_text_layout() {
        let bytes = PlainTextWriter
            .serialize("doc.pdf", &lines(&["", "--- PAGE 2 ---", "hello"]))
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "doc.pdf\n\n\n--- PAGE 2 ---\nhello\n"
        );
        assert_eq!(PlainTextWriter.extension(), "txt");
        assert_eq!(DocxWriter.media_kind(), MediaKind::Docx);
    }
}
