//! PDF structure operations over `lopdf`.
//!
//! Page copy is a deep clone of each page's object graph into a fresh
//! document: content streams are copied byte for byte (never re-encoded),
//! shared objects such as fonts are cloned once, and attributes a page
//! inherits from its page-tree ancestors (`MediaBox`, `Resources`,
//! `CropBox`, `Rotate`) are materialised on the copy.
//!
//! Overlay merge first detaches every page (inline, page-owned `Resources`,
//! `Font` and `Contents`) and only then appends the overlay, so no object
//! shared between pages is modified.

use crate::backend::{PageSize, PdfStructure};
use crate::error::{PageError, PagesError};
use crate::pipeline::watermark::OverlayPage;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument, warn};

const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// [`PdfStructure`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfStructure;

impl LopdfStructure {
    pub fn new() -> Self {
        Self
    }
}

impl PdfStructure for LopdfStructure {
    fn page_count(&self, pdf: &[u8]) -> Result<usize, PagesError> {
        Ok(load(pdf)?.get_pages().len())
    }

    fn extract_text(&self, pdf: &[u8], page_index: usize) -> Result<String, PageError> {
        let document = Document::load_mem(pdf).map_err(|e| PageError::TextExtractionFailed {
            page: page_index + 1,
            detail: e.to_string(),
        })?;
        page_text(&document, page_index)
    }

    fn extract_texts(&self, pdf: &[u8], page_indices: &[usize]) -> Vec<Result<String, PageError>> {
        match Document::load_mem(pdf) {
            Ok(document) => page_indices
                .iter()
                .map(|&i| page_text(&document, i))
                .collect(),
            Err(e) => page_indices
                .iter()
                .map(|&i| {
                    Err(PageError::TextExtractionFailed {
                        page: i + 1,
                        detail: e.to_string(),
                    })
                })
                .collect(),
        }
    }

    #[instrument(skip_all, fields(pages = page_indices.len()))]
    fn copy_pages(&self, pdf: &[u8], page_indices: &[usize]) -> Result<Vec<u8>, PagesError> {
        let source = load(pdf)?;
        let source_pages = source.get_pages();

        let mut target = Document::with_version(source.version.clone());
        let pages_id = target.new_object_id();
        let mut memo: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut kids = Vec::with_capacity(page_indices.len());

        // Reserve every copied page up front so references between them
        // (link destinations, annotation /P) resolve to the in-tree copy.
        let mut copied = Vec::with_capacity(page_indices.len());
        for &index in page_indices {
            let page_id = page_object_id(&source_pages, index)?;
            if !memo.contains_key(&page_id) {
                memo.insert(page_id, target.new_object_id());
            }
            copied.push(page_id);
        }
        let kept: HashSet<ObjectId> = copied.iter().copied().collect();

        for page_id in copied {
            let mut page = source.get_dictionary(page_id).map_err(corrupt)?.clone();
            prune_foreign_links(&source, &mut page, &kept);

            for key in INHERITABLE {
                if !page.has(key) {
                    if let Some(value) = inherited_attribute(&source, &page, key) {
                        page.set(key.to_vec(), value);
                    }
                }
            }
            page.remove(b"Parent");

            let new_id = memo[&page_id];
            let mut cloned = clone_dictionary(&source, &mut target, &page, &mut memo)?;
            cloned.set("Parent", pages_id);
            target.objects.insert(new_id, Object::Dictionary(cloned));
            kids.push(Object::Reference(new_id));
        }

        let count = kids.len() as i64;
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);

        debug!(copied = count, objects = target.objects.len(), "Pages copied");
        save(&mut target)
    }

    fn page_size(&self, pdf: &[u8], page_index: usize) -> Result<PageSize, PagesError> {
        let document = load(pdf)?;
        let pages = document.get_pages();
        let page_id = page_object_id(&pages, page_index)?;
        let page = document.get_dictionary(page_id).map_err(corrupt)?;

        let media_box = match page.get(b"MediaBox") {
            Ok(obj) => Some(obj.clone()),
            Err(_) => inherited_attribute(&document, page, b"MediaBox"),
        };

        Ok(media_box
            .and_then(|obj| rect_size(&document, &obj))
            .unwrap_or(PageSize::LETTER))
    }

    #[instrument(skip_all, fields(fonts = overlay.fonts.len()))]
    fn merge_overlay(&self, pdf: &[u8], overlay: &OverlayPage) -> Result<Vec<u8>, PagesError> {
        let mut document = load(pdf)?;

        let fonts: Vec<(Vec<u8>, ObjectId)> = overlay
            .fonts
            .iter()
            .map(|font| {
                let id = document.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => Object::Name(font.base_font.as_bytes().to_vec()),
                    "Encoding" => "WinAnsiEncoding",
                });
                (font.resource_name.as_bytes().to_vec(), id)
            })
            .collect();

        // One save/restore pair isolates the page's own graphics state from
        // the overlay drawn after it.
        let open_id = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut overlay_content = b"Q\n".to_vec();
        overlay_content.extend_from_slice(&overlay.content);
        let overlay_id = document.add_object(Stream::new(Dictionary::new(), overlay_content));

        let page_ids: Vec<ObjectId> = document.get_pages().values().copied().collect();
        for page_id in &page_ids {
            detach_page(&mut document, *page_id)?;
            merge_onto_page(&mut document, *page_id, open_id, overlay_id, &fonts)?;
        }

        debug!(pages = page_ids.len(), "Overlay merged");
        save(&mut document)
    }
}

// ── Loading / saving ──────────────────────────────────────────────────────

fn load(pdf: &[u8]) -> Result<Document, PagesError> {
    Document::load_mem(pdf).map_err(corrupt)
}

fn save(document: &mut Document) -> Result<Vec<u8>, PagesError> {
    let mut output = Vec::new();
    document.save_to(&mut output).map_err(|err| corrupt(lopdf::Error::from(err)))?;
    Ok(output)
}

fn corrupt(err: lopdf::Error) -> PagesError {
    PagesError::CorruptPdf {
        detail: err.to_string(),
    }
}

fn page_object_id(pages: &BTreeMap<u32, ObjectId>, index: usize) -> Result<ObjectId, PagesError> {
    pages
        .get(&(index as u32 + 1))
        .copied()
        .ok_or(PagesError::PageOutOfRange {
            page: index + 1,
            total: pages.len(),
        })
}

fn page_text(document: &Document, page_index: usize) -> Result<String, PageError> {
    let total = document.get_pages().len();
    if page_index >= total {
        return Err(PageError::TextExtractionFailed {
            page: page_index + 1,
            detail: format!("document has {total} pages"),
        });
    }
    document
        .extract_text(&[page_index as u32 + 1])
        .map_err(|e| PageError::TextExtractionFailed {
            page: page_index + 1,
            detail: e.to_string(),
        })
}

// ── Page tree helpers ─────────────────────────────────────────────────────

/// Walk the `/Parent` chain looking for an inheritable attribute.
fn inherited_attribute(document: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        if depth >= MAX_TREE_DEPTH {
            warn!(?id, "Page tree too deep, giving up on inherited attribute");
            return None;
        }
        let node = document.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn rect_size(document: &Document, rect: &Object) -> Option<PageSize> {
    let values = resolve(document, rect)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut nums = [0f32; 4];
    for (slot, value) in nums.iter_mut().zip(values) {
        *slot = resolve(document, value)?.as_float().ok()?;
    }
    let width = (nums[2] - nums[0]).abs();
    let height = (nums[3] - nums[1]).abs();
    (width > 0.0 && height > 0.0).then_some(PageSize { width, height })
}

// ── Deep clone ────────────────────────────────────────────────────────────

fn clone_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object, PagesError> {
    Ok(match object {
        Object::Reference(id) => match clone_reference(source, target, *id, memo)? {
            Some(new_id) => Object::Reference(new_id),
            None => Object::Null,
        },
        Object::Dictionary(dict) => Object::Dictionary(clone_dictionary(source, target, dict, memo)?),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| clone_object(source, target, item, memo))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Object::Stream(stream) => {
            let mut copy = stream.clone();
            copy.dict = clone_dictionary(source, target, &stream.dict, memo)?;
            Object::Stream(copy)
        }
        other => other.clone(),
    })
}

/// `/Parent` is skipped everywhere: the page's parent is patched by the
/// caller and form-field parents are not part of a page copy.
fn clone_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary, PagesError> {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        copy.set(key.clone(), clone_object(source, target, value, memo)?);
    }
    Ok(copy)
}

/// Pages outside the copy are never pulled in: a reference to one becomes
/// `None` and is written as `Null`.
fn clone_reference(
    source: &Document,
    target: &mut Document,
    id: ObjectId,
    memo: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Option<ObjectId>, PagesError> {
    if let Some(&new_id) = memo.get(&id) {
        return Ok(Some(new_id));
    }
    if is_page(source, id) {
        debug!(?id, "Reference to a page outside the copy, using Null");
        return Ok(None);
    }
    let new_id = target.new_object_id();
    memo.insert(id, new_id);

    let cloned = match source.get_object(id) {
        Ok(object) => clone_object(source, target, object, memo)?,
        Err(err) => {
            warn!(?id, %err, "Cannot resolve reference, using Null");
            Object::Null
        }
    };
    target.objects.insert(new_id, cloned);
    Ok(Some(new_id))
}

fn is_page(document: &Document, id: ObjectId) -> bool {
    document
        .get_dictionary(id)
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page")
}

/// Drop link annotations whose destination is a page outside `kept`.
fn prune_foreign_links(source: &Document, page: &mut Dictionary, kept: &HashSet<ObjectId>) {
    let Ok(annots) = page.get(b"Annots") else {
        return;
    };
    let Some(items) = resolve(source, annots).and_then(|o| o.as_array().ok()) else {
        return;
    };
    let before = items.len();
    let retained: Vec<Object> = items
        .iter()
        .filter(|annot| !links_outside(source, annot, kept))
        .cloned()
        .collect();
    if retained.len() != before {
        debug!(dropped = before - retained.len(), "Dropped links to pages outside the copy");
        page.set("Annots", retained);
    }
}

fn links_outside(source: &Document, annot: &Object, kept: &HashSet<ObjectId>) -> bool {
    let Some(dict) = resolve(source, annot).and_then(|o| o.as_dict().ok()) else {
        return false;
    };
    let dest = dict.get(b"Dest").ok().or_else(|| {
        dict.get(b"A")
            .ok()
            .and_then(|action| resolve(source, action))
            .and_then(|action| action.as_dict().ok())
            .and_then(|action| action.get(b"D").ok())
    });
    let Some(dest) = dest
        .and_then(|d| resolve(source, d))
        .and_then(|d| d.as_array().ok())
    else {
        return false;
    };
    match dest.first() {
        Some(Object::Reference(id)) => !kept.contains(id) && is_page(source, *id),
        _ => false,
    }
}

// ── Overlay merge ─────────────────────────────────────────────────────────

/// Give a page its own `Resources`, `Font` and `Contents` objects so the
/// merge never writes into something another page also points at.
fn detach_page(document: &mut Document, page_id: ObjectId) -> Result<(), PagesError> {
    let page = document.get_dictionary(page_id).map_err(corrupt)?;

    let resources_obj = match page.get(b"Resources") {
        Ok(obj) => Some(obj.clone()),
        Err(_) => inherited_attribute(document, page, b"Resources"),
    };
    let mut resources = resources_obj
        .as_ref()
        .and_then(|obj| resolve(document, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    let fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve(document, obj))
        .and_then(|obj| obj.as_dict().ok())
        .cloned();
    if let Some(fonts) = fonts {
        resources.set("Font", fonts);
    }

    let contents: Vec<Object> = match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match document.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let page = document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(corrupt)?;
    page.set("Resources", resources);
    page.set("Contents", contents);
    Ok(())
}

fn merge_onto_page(
    document: &mut Document,
    page_id: ObjectId,
    open_id: ObjectId,
    overlay_id: ObjectId,
    fonts: &[(Vec<u8>, ObjectId)],
) -> Result<(), PagesError> {
    let page = document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(corrupt)?;

    let mut resources = match page.get(b"Resources") {
        Ok(Object::Dictionary(d)) => d.clone(),
        _ => Dictionary::new(),
    };
    let mut font_dict = match resources.get(b"Font") {
        Ok(Object::Dictionary(d)) => d.clone(),
        _ => Dictionary::new(),
    };
    for (name, id) in fonts {
        font_dict.set(name.clone(), Object::Reference(*id));
    }
    resources.set("Font", font_dict);
    page.set("Resources", resources);

    let mut contents = match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    contents.insert(0, Object::Reference(open_id));
    contents.push(Object::Reference(overlay_id));
    page.set("Contents", contents);
    Ok(())
}
