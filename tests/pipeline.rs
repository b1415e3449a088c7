//! Integration tests for edgequake-pdfpages.
//!
//! Every PDF is generated in-process with `lopdf`, and rasterisation and
//! recognition are replaced by in-memory fakes, so these tests need
//! neither pdfium nor tesseract.
//!
//! Run with:
//!   cargo test --test pipeline

use edgequake_pdfpages::pipeline::docx::PlainTextWriter;
use edgequake_pdfpages::pipeline::structure::LopdfStructure;
use edgequake_pdfpages::{
    export_async, export_stream, search, write_artifact, write_artifact_async, Document,
    ExportConfig, ExportEngine, ExportTarget, MediaKind, OcrProgressCallback, PagesError,
    PdfStructure, ProgressCallback, Rasterizer, RecognitionError, Session, TextRecognizer,
};
use futures::StreamExt;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// An `n`-page PDF; page `i` is `100 + i` points wide and shows "Page i".
fn make_pdf(n: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for i in 1..=n {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![20.into(), 50.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {i}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (100 + i as i64).into(), 200.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => n as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A 3-page PDF whose first page carries a link to page 2, a GoTo action
/// to page 3, and a note annotation whose `/P` points at page 3.
fn make_linked_pdf() -> Vec<u8> {
    let mut doc = lopdf::Document::load_mem(&make_pdf(3)).unwrap();
    let pages = doc.get_pages();
    let (p1, p2, p3) = (pages[&1], pages[&2], pages[&3]);

    let rect = || vec![0.into(), 0.into(), 10.into(), 10.into()];
    let link = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect(),
        "Dest" => vec![p2.into(), "Fit".into()],
    });
    let goto = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect(),
        "A" => dictionary! {
            "S" => "GoTo",
            "D" => vec![p3.into(), "Fit".into()],
        },
    });
    let note = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => rect(),
        "Contents" => Object::string_literal("see page 3"),
        "P" => p3,
    });
    doc.get_object_mut(p1)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Annots", vec![link.into(), goto.into(), note.into()]);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Page objects present anywhere in the file, reachable from the tree or not.
fn page_object_count(pdf: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    doc.objects
        .values()
        .filter_map(|o| o.as_dict().ok())
        .filter(|d| {
            d.get(b"Type")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Page")
        })
        .count()
}

/// Whether any content stream in the file draws `text`.
fn draws_text(pdf: &[u8], text: &str) -> bool {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    let needle = text.as_bytes();
    doc.objects.values().any(|o| match o {
        Object::Stream(stream) => {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.windows(needle.len()).any(|w| w == needle)
        }
        _ => false,
    })
}

fn first_page_annots(pdf: &[u8]) -> Vec<lopdf::Dictionary> {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    let page = doc.get_pages()[&1];
    let dict = doc.get_dictionary(page).unwrap();
    let Ok(annots) = dict.get(b"Annots").and_then(Object::as_array) else {
        return Vec::new();
    };
    annots
        .iter()
        .map(|a| match a {
            Object::Reference(id) => doc.get_dictionary(*id).unwrap().clone(),
            other => other.as_dict().unwrap().clone(),
        })
        .collect()
}

fn load(name: &str, pages: usize) -> Document {
    Document::load(name, make_pdf(pages), &LopdfStructure::new()).unwrap()
}

fn widths(pdf: &[u8]) -> Vec<f32> {
    let structure = LopdfStructure::new();
    let n = structure.page_count(pdf).unwrap();
    (0..n)
        .map(|i| structure.page_size(pdf, i).unwrap().width)
        .collect()
}

fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// One solid bitmap per page, `i + 1` pixels wide.
struct FakeRasterizer(usize);

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &[u8], _dpi: u32) -> Result<Vec<DynamicImage>, PagesError> {
        Ok((0..self.0)
            .map(|i| DynamicImage::new_rgb8(i as u32 + 1, 4))
            .collect())
    }
}

/// Reports the bitmap width as the recognised text.
struct WidthRecognizer;

impl TextRecognizer for WidthRecognizer {
    fn recognize(&self, image: &DynamicImage, _language: &str) -> Result<String, RecognitionError> {
        Ok(format!("width {}", image.width()))
    }
}

struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn recognize(&self, _image: &DynamicImage, _language: &str) -> Result<String, RecognitionError> {
        Err(RecognitionError::Exit {
            status: "exit status: 1".into(),
            stderr: "Empty page!!".into(),
        })
    }
}

#[derive(Default)]
struct ProgressRecorder {
    percents: Mutex<Vec<u8>>,
    degraded: Mutex<Option<usize>>,
}

impl OcrProgressCallback for ProgressRecorder {
    fn on_progress(&self, percent: u8) {
        self.percents.lock().unwrap().push(percent);
    }

    fn on_ocr_complete(&self, _total_pages: usize, degraded: usize) {
        *self.degraded.lock().unwrap() = Some(degraded);
    }
}

fn fake_engine(config: ExportConfig, pages: usize) -> ExportEngine {
    ExportEngine::new(config)
        .with_rasterizer(Arc::new(FakeRasterizer(pages)))
        .with_recognizer(Arc::new(WidthRecognizer))
        .with_writer(Arc::new(PlainTextWriter))
}

// ── Selection through a session ──────────────────────────────────────────────

#[test]
fn quick_range_reaffirm_and_deselect() {
    let document = load("ten.pdf", 10);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "2,5,8,-3").unwrap();
    assert_eq!(
        session.selected_pages(&document).unwrap(),
        vec![1, 2, 4, 5, 6, 7, 8, 9, 10]
    );
}

#[test]
fn later_token_overrides_earlier_range() {
    let document = load("eight.pdf", 8);
    let mut session = Session::new();
    session.open(&document);
    session.deselect_all(&document).unwrap();
    session.apply_quick_range(&document, "3-6,-4").unwrap();
    assert_eq!(session.selected_pages(&document).unwrap(), vec![3, 5, 6]);
}

#[test]
fn out_of_range_pages_are_skipped() {
    let document = load("three.pdf", 3);
    let mut session = Session::new();
    session.open(&document);
    session.deselect_all(&document).unwrap();
    session.apply_quick_range(&document, "0,2,9,2-5").unwrap();
    assert_eq!(session.selected_pages(&document).unwrap(), vec![2, 3]);
}

#[test]
fn malformed_expression_changes_nothing() {
    let document = load("five.pdf", 5);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-2").unwrap();

    for bad in ["a-3", "4-2", "1;2", "3-"] {
        assert!(
            session.apply_quick_range(&document, bad).is_err(),
            "{bad} should be rejected"
        );
        assert_eq!(session.selected_pages(&document).unwrap(), vec![1, 3, 4, 5]);
    }
}

#[test]
fn oversized_page_numbers_are_out_of_range() {
    let document = load("ten.pdf", 10);
    let mut session = Session::new();
    session.open(&document);
    session.deselect_all(&document).unwrap();

    session
        .apply_quick_range(&document, "2,99999999999999999999999")
        .unwrap();
    assert_eq!(session.selected_pages(&document).unwrap(), vec![2]);

    session
        .apply_quick_range(&document, "8-99999999999999999999")
        .unwrap();
    assert_eq!(session.selected_pages(&document).unwrap(), vec![2, 8, 9, 10]);
}

// ── Trimmed PDF ──────────────────────────────────────────────────────────────

#[test]
fn trimmed_pdf_follows_the_accepted_order() {
    let document = load("report.pdf", 10);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "1-10,-4").unwrap();
    session
        .propose_order(&document, &[9, 0, 1, 2, 4, 5, 6, 7, 8])
        .unwrap();

    let engine = ExportEngine::new(ExportConfig::default());
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();

    assert_eq!(artifact.filename, "report.pdf");
    assert_eq!(artifact.media_kind, MediaKind::Pdf);
    assert_eq!(
        widths(&artifact.bytes),
        vec![110.0, 101.0, 102.0, 103.0, 105.0, 106.0, 107.0, 108.0, 109.0]
    );
}

#[test]
fn rejected_order_falls_back_to_previous() {
    let document = load("report.pdf", 4);
    let mut session = Session::new();
    session.open(&document);
    session.propose_order(&document, &[3, 2, 1, 0]).unwrap();
    assert!(session.propose_order(&document, &[3, 2, 1]).is_err());

    let engine = ExportEngine::new(ExportConfig::default());
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();
    assert_eq!(widths(&artifact.bytes), vec![104.0, 103.0, 102.0, 101.0]);
}

#[test]
fn watermark_is_stamped_on_every_page() {
    let document = load("draft.pdf", 3);
    let mut session = Session::new();
    session.open(&document);

    let config = ExportConfig::builder().watermark("DRAFT").build().unwrap();
    let engine = ExportEngine::new(config);
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();

    let pdf = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    let pages = pdf.get_pages();
    assert_eq!(pages.len(), 3);
    for (number, page_id) in pages {
        let content = pdf.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("(DRAFT)"), "page {number} lacks the watermark");
        assert!(text.contains(&format!("(Page {number})")), "page {number} lost its content");
    }
}

#[test]
fn blank_watermark_leaves_pages_untouched() {
    let document = load("plain.pdf", 2);
    let mut session = Session::new();
    session.open(&document);

    let config = ExportConfig::builder().watermark("   ").build().unwrap();
    let artifact = ExportEngine::new(config)
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();

    let pdf = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    for page_id in pdf.get_pages().values() {
        let content = pdf.get_page_content(*page_id).unwrap();
        assert!(!String::from_utf8_lossy(&content).contains("DRAFT"));
    }
}

// ── Bundles ──────────────────────────────────────────────────────────────────

#[test]
fn trimmed_pdf_drops_links_into_deselected_pages() {
    let document = Document::load("linked.pdf", make_linked_pdf(), &LopdfStructure::new()).unwrap();
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-2-3").unwrap();

    let artifact = ExportEngine::new(ExportConfig::default())
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();

    assert_eq!(widths(&artifact.bytes), vec![101.0]);
    assert_eq!(page_object_count(&artifact.bytes), 1);
    assert!(draws_text(&artifact.bytes, "Page 1"));
    assert!(!draws_text(&artifact.bytes, "Page 2"));
    assert!(!draws_text(&artifact.bytes, "Page 3"));

    // Both links are gone; the note stays but no longer points anywhere.
    let annots = first_page_annots(&artifact.bytes);
    assert_eq!(annots.len(), 1);
    assert_eq!(annots[0].get(b"Subtype").unwrap().as_name().unwrap(), b"Text");
    assert!(matches!(annots[0].get(b"P"), Ok(Object::Null) | Err(_)));
}

#[test]
fn trimmed_pdf_keeps_links_between_exported_pages() {
    let document = Document::load("linked.pdf", make_linked_pdf(), &LopdfStructure::new()).unwrap();
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-3").unwrap();

    let artifact = ExportEngine::new(ExportConfig::default())
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();

    assert_eq!(page_object_count(&artifact.bytes), 2);
    assert!(!draws_text(&artifact.bytes, "Page 3"));

    let out = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    let second = out.get_pages()[&2];
    let annots = first_page_annots(&artifact.bytes);
    assert_eq!(annots.len(), 2);
    let dest = annots[0].get(b"Dest").unwrap().as_array().unwrap();
    assert_eq!(dest[0].as_reference().unwrap(), second);
}

#[test]
fn page_bundle_entries_hold_only_their_own_page() {
    let document = Document::load("linked.pdf", make_linked_pdf(), &LopdfStructure::new()).unwrap();
    let mut session = Session::new();
    session.open(&document);
    session.deselect_all(&document).unwrap();
    session.apply_quick_range(&document, "1").unwrap();

    let artifact = ExportEngine::new(ExportConfig::default())
        .export(&session.request(&document).unwrap(), ExportTarget::PageBundle)
        .unwrap();
    assert_eq!(zip_entries(&artifact.bytes), vec!["linked_page_1.pdf"]);

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
    let mut page = Vec::new();
    archive
        .by_name("linked_page_1.pdf")
        .unwrap()
        .read_to_end(&mut page)
        .unwrap();
    assert_eq!(page_object_count(&page), 1);
    assert!(!draws_text(&page, "Page 2"));
    assert!(!draws_text(&page, "Page 3"));
    assert_eq!(first_page_annots(&page).len(), 1);
}

#[test]
fn page_bundle_holds_one_pdf_per_selected_page() {
    let document = load("deck.pdf", 5);
    let mut session = Session::new();
    session.open(&document);
    session.deselect_all(&document).unwrap();
    session.apply_quick_range(&document, "4,2").unwrap();
    session.propose_order(&document, &[3, 1]).unwrap();

    let config = ExportConfig::builder().filename_prefix("x_").build().unwrap();
    let artifact = ExportEngine::new(config)
        .export(&session.request(&document).unwrap(), ExportTarget::PageBundle)
        .unwrap();

    assert_eq!(artifact.filename, "deck_pages.zip");
    assert_eq!(
        zip_entries(&artifact.bytes),
        vec!["x_deck_page_2.pdf", "x_deck_page_4.pdf"]
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
    let mut page = Vec::new();
    archive
        .by_name("x_deck_page_4.pdf")
        .unwrap()
        .read_to_end(&mut page)
        .unwrap();
    assert_eq!(widths(&page), vec![104.0]);
}

#[test]
fn image_bundle_encodes_selected_pages_as_png() {
    let document = load("scan.pdf", 4);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-1").unwrap();

    let engine = fake_engine(ExportConfig::default(), 4);
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::ImageBundle)
        .unwrap();

    assert_eq!(artifact.filename, "scan_images.zip");
    assert_eq!(
        zip_entries(&artifact.bytes),
        vec!["scan_page_2.png", "scan_page_3.png", "scan_page_4.png"]
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
    let mut png = Vec::new();
    archive
        .by_name("scan_page_3.png")
        .unwrap()
        .read_to_end(&mut png)
        .unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!(image.width(), 3);
}

// ── Text documents ───────────────────────────────────────────────────────────

#[test]
fn ocr_document_follows_order_and_reports_progress() {
    let document = load("letters.pdf", 4);
    let mut session = Session::new();
    session.open(&document);
    session.propose_order(&document, &[3, 2, 1, 0]).unwrap();

    let recorder = Arc::new(ProgressRecorder::default());
    let config = ExportConfig::builder()
        .progress_callback(recorder.clone() as ProgressCallback)
        .build()
        .unwrap();
    let artifact = fake_engine(config, 4)
        .export(&session.request(&document).unwrap(), ExportTarget::OcrDocument)
        .unwrap();

    assert_eq!(artifact.filename, "letters.txt");
    let text = String::from_utf8(artifact.bytes).unwrap();
    let p4 = text.find("--- PAGE 4 ---").unwrap();
    let p1 = text.find("--- PAGE 1 ---").unwrap();
    assert!(p4 < p1);
    assert!(text.contains("--- PAGE 4 ---\nwidth 4\n"));
    assert!(text.starts_with("letters.pdf\n\n"));

    assert_eq!(*recorder.percents.lock().unwrap(), vec![25, 50, 75, 100]);
    assert_eq!(*recorder.degraded.lock().unwrap(), Some(0));
}

#[test]
fn ocr_document_survives_every_page_failing() {
    let document = load("blurry.pdf", 3);
    let mut session = Session::new();
    session.open(&document);

    let engine = fake_engine(ExportConfig::default(), 3).with_recognizer(Arc::new(BrokenRecognizer));
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::OcrDocument)
        .unwrap();

    let text = String::from_utf8(artifact.bytes).unwrap();
    assert_eq!(text.matches("--- PAGE ").count(), 3);
    for n in 1..=3 {
        assert!(text.contains(&format!("--- PAGE {n} ---\n\n")));
    }
}

#[test]
fn ocr_without_rasteriser_output_is_fatal() {
    let document = load("empty_raster.pdf", 2);
    let mut session = Session::new();
    session.open(&document);

    let engine = fake_engine(ExportConfig::default(), 0);
    let err = engine
        .export(&session.request(&document).unwrap(), ExportTarget::OcrDocument)
        .unwrap_err();
    assert!(matches!(err, PagesError::RasterUnavailable { .. }));
}

#[test]
fn embedded_text_document_uses_the_text_layer() {
    let document = load("layer.pdf", 3);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-2").unwrap();
    session.propose_order(&document, &[2, 0]).unwrap();

    let artifact = ExportEngine::new(ExportConfig::default())
        .export(
            &session.request(&document).unwrap(),
            ExportTarget::EmbeddedTextDocument,
        )
        .unwrap();

    assert_eq!(artifact.filename, "layer.docx");
    assert_eq!(artifact.media_kind, MediaKind::Docx);

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    let p3 = xml.find("--- PAGE 3 ---").unwrap();
    let p1 = xml.find("--- PAGE 1 ---").unwrap();
    assert!(p3 < p1);
    assert!(xml.contains("Page 3"));
    assert!(!xml.contains("--- PAGE 2 ---"));
}

// ── Search ───────────────────────────────────────────────────────────────────

#[test]
fn search_counts_case_insensitively() {
    let results = search("AAAA", &["a"]);
    let found = &results["a"];
    assert_eq!(found.count, 4);
    assert_eq!(found.contexts.len(), 4);
    assert!(found.contexts.iter().all(|c| c == "AAAA"));
}

#[test]
fn search_over_exported_text_layer() {
    let document = load("layer.pdf", 3);
    let mut session = Session::new();
    session.open(&document);

    let engine = ExportEngine::new(ExportConfig::default());
    let pages = engine
        .embedded_texts(&session.request(&document).unwrap())
        .unwrap();
    let text: String = pages.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>().join("\n");

    let results = search(&text, &["page", "missing"]);
    assert_eq!(results["page"].count, 3);
    assert_eq!(results["missing"].count, 0);
    assert!(results["missing"].contexts.is_empty());
}

// ── Output and async facade ──────────────────────────────────────────────────

#[test]
fn write_artifact_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let document = load("same.pdf", 2);
    let mut session = Session::new();
    session.open(&document);
    let engine = ExportEngine::new(ExportConfig::default());

    std::fs::write(dir.path().join("same.pdf"), b"stale").unwrap();
    let artifact = engine
        .export(&session.request(&document).unwrap(), ExportTarget::TrimmedPdf)
        .unwrap();
    let path = write_artifact(dir.path(), &artifact).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, artifact.bytes);
    assert_eq!(widths(&written), vec![101.0, 102.0]);
}

#[tokio::test]
async fn export_async_then_write() {
    let dir = tempfile::tempdir().unwrap();
    let document = load("async.pdf", 3);
    let mut session = Session::new();
    session.open(&document);
    session.apply_quick_range(&document, "-2").unwrap();

    let engine = Arc::new(ExportEngine::new(ExportConfig::default()));
    let artifact = export_async(
        engine,
        session.request(&document).unwrap(),
        ExportTarget::PageBundle,
    )
    .await
    .unwrap();
    let path = write_artifact_async(&dir.path().join("nested"), &artifact)
        .await
        .unwrap();

    assert!(path.ends_with("nested/async_pages.zip"));
    let bytes = tokio::fs::read(&path).await.unwrap();
    assert_eq!(
        zip_entries(&bytes),
        vec!["async_page_1.pdf", "async_page_3.pdf"]
    );
}

#[tokio::test]
async fn export_stream_isolates_failing_documents() {
    let mut session = Session::new();
    let good = load("good.pdf", 2);
    let empty = load("empty.pdf", 2);
    let other = load("other.pdf", 3);
    for document in [&good, &empty, &other] {
        session.open(document);
    }
    session.deselect_all(&empty).unwrap();

    let requests = vec![
        session.request(&good).unwrap(),
        session.request(&empty).unwrap(),
        session.request(&other).unwrap(),
    ];
    let engine = Arc::new(ExportEngine::new(ExportConfig::default()));
    let items: Vec<_> = export_stream(engine, requests, ExportTarget::TrimmedPdf)
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].1.as_ref().unwrap().filename, "good.pdf");
    assert!(matches!(
        items[1].1,
        Err(PagesError::EmptySelection { ref document }) if document == "empty.pdf"
    ));
    assert_eq!(widths(&items[2].1.as_ref().unwrap().bytes), vec![101.0, 102.0, 103.0]);
}
