//! Watermark overlay synthesis.
//!
//! The overlay is built once per export at the size of the first output
//! page and merged onto every page by
//! [`crate::backend::PdfStructure::merge_overlay`].

use crate::backend::PageSize;
use crate::error::PagesError;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Resource name under which the overlay font is registered on each page.
/// Chosen to be unlikely to clash with names already in a page's resources.
pub const FONT_RESOURCE: &str = "EqWm1";

const BASE_FONT: &str = "Helvetica";
const GREY: f32 = 0.6;

/// A font the overlay content refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFont {
    pub resource_name: String,
    pub base_font: String,
}

/// A single-page overlay: a content stream plus the fonts it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPage {
    pub width: f32,
    pub height: f32,
    /// Decoded content-stream operators, wrapped in `q … Q`.
    pub content: Vec<u8>,
    pub fonts: Vec<OverlayFont>,
}

/// Diagonal grey text across a page of the given size.
pub fn synthesize(text: &str, size: PageSize) -> Result<OverlayPage, PagesError> {
    let font_size = (size.width.min(size.height) / 10.0).max(8.0);
    let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
    let x = size.width * 0.15;
    let y = size.height * 0.25;

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![GREY.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(FONT_RESOURCE.into()), font_size.into()]),
            Operation::new(
                "Tm",
                vec![cos.into(), sin.into(), (-sin).into(), cos.into(), x.into(), y.into()],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };

    let content = content.encode().map_err(|e| PagesError::Internal(format!(
        "watermark content encoding failed: {e}"
    )))?;

    Ok(OverlayPage {
        width: size.width,
        height: size.height,
        content,
        fonts: vec![OverlayFont {
            resource_name: FONT_RESOURCE.to_string(),
            base_font: BASE_FONT.to_string(),
        }],
    })
}

/// Latin-1 subset of WinAnsiEncoding; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}
