//! PDF text extraction and plain-text PDF rendering
//!
//! Extraction never fails: a document that cannot be parsed or decoded
//! yields an empty string, which callers report as an extraction failure.
//!
//! Rendering lays text out line by line on US Letter pages with a naive
//! fixed-width wrap (character count, not word-aware).

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::BLOCK_SEPARATOR;

/// US Letter width in points
pub const PAGE_WIDTH: i64 = 612;
/// US Letter height in points
pub const PAGE_HEIGHT: i64 = 792;
pub const MARGIN: i64 = 72;
pub const LINE_HEIGHT: i64 = 14;
pub const FONT_SIZE: i64 = 12;
/// Characters per drawn chunk
pub const WRAP_WIDTH: usize = 100;

const FONT_NAME: &[u8] = b"F1";

/// Extract per-page text, trimmed, non-empty pages joined by a blank line
pub fn extract_text(bytes: &[u8]) -> String {
    match extract_pages(bytes) {
        Ok(pages) => pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR),
        Err(e) => {
            warn!("Error extracting text from PDF: {}", e);
            String::new()
        }
    }
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, lopdf::Error> {
    let doc = Document::load_mem(bytes)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!("Extracting text from {} PDF pages", page_numbers.len());

    page_numbers
        .iter()
        .map(|&number| doc.extract_text(&[number]))
        .collect()
}

/// A chunk of text placed at a baseline position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub x: i64,
    pub y: i64,
    pub text: String,
}

/// Split one logical line into `width`-character chunks
///
/// An empty line produces no chunks.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Lay text out into pages of placed lines
///
/// The cursor starts one margin below the top edge, moves down one line
/// height per chunk, and a new page begins when the cursor has dropped
/// below the bottom margin. Always returns at least one (possibly empty)
/// page.
pub fn layout(text: &str) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![Vec::new()];
    let mut y = top;

    for line in text.lines() {
        for chunk in wrap_line(line, WRAP_WIDTH) {
            if y < MARGIN {
                pages.push(Vec::new());
                y = top;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    x: MARGIN,
                    y,
                    text: chunk,
                });
            }
            y -= LINE_HEIGHT;
        }
    }

    pages
}

/// Render text to a new PDF document
pub fn synthesize(text: &str) -> Result<Vec<u8>, FormatError> {
    let pages = layout(text);
    render(&pages)
}

fn render(pages: &[Vec<PlacedLine>]) -> Result<Vec<u8>, FormatError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, resources_id, page)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| FormatError::Pdf(format!("Save failed: {}", e)))?;

    Ok(buffer)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    lines: &[PlacedLine],
) -> Result<ObjectId, FormatError> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(FONT_NAME.to_vec()), Object::Integer(FONT_SIZE)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(line.x), Object::Integer(line.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&line.text),
                StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| FormatError::Pdf(format!("Content encoding failed: {}", e)))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    }))
}

/// Encode text for a WinAnsi simple font; unmappable characters become `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\t' => b' ',
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{20ac}' => 0x80,
            _ => b'?',
        })
        .collect()
}
