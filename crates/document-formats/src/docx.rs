//! DOCX (WordprocessingML) text extraction and synthesis
//!
//! Only the main document part is read. Body paragraphs are collected in
//! order; paragraphs nested in tables are not body paragraphs and are
//! skipped. Synthesis writes the smallest package Word accepts: content
//! types, package relationships and `word/document.xml`.

use std::io::{Cursor, Read, Write};

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::FormatError;
use crate::BLOCK_SEPARATOR;

const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter, one-inch margins (twentieths of a point)
const DOCUMENT_FOOTER: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// Extract non-empty body paragraphs, trimmed, joined by a blank line
///
/// Failures (not a zip, missing document part, malformed XML) propagate.
pub fn extract_text(bytes: &[u8]) -> Result<String, FormatError> {
    let xml = read_document_part(bytes)?;
    let paragraphs = parse_paragraphs(&xml)?;

    Ok(paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR))
}

fn read_document_part(bytes: &[u8]) -> Result<String, FormatError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut part = archive.by_name(DOCUMENT_PART)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Raw text of every body paragraph, including empty ones
///
/// Tables and text boxes carry their own paragraphs; neither is body text,
/// so everything inside them is skipped.
pub(crate) fn parse_paragraphs(xml: &str) -> Result<Vec<String>, FormatError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut skip_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => skip_depth += 1,
                _ if skip_depth > 0 => {}
                b"w:p" => current = Some(String::new()),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if skip_depth == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    match e.name().as_ref() {
                        b"w:tab" if in_run => paragraph.push('\t'),
                        b"w:br" | b"w:cr" if in_run => paragraph.push('\n'),
                        _ => {}
                    }
                } else if e.name().as_ref() == b"w:p" {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(t) if in_text && skip_depth == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => skip_depth = skip_depth.saturating_sub(1),
                _ if skip_depth > 0 => {}
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Build a new DOCX with one paragraph per blank-line-separated chunk
pub fn synthesize(text: &str) -> Result<Vec<u8>, FormatError> {
    let document_xml = render_document_xml(text);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("[Content_Types].xml", options)?;
    writer.write_all(CONTENT_TYPES_XML.as_bytes())?;
    writer.start_file("_rels/.rels", options)?;
    writer.write_all(PACKAGE_RELS_XML.as_bytes())?;
    writer.start_file(DOCUMENT_PART, options)?;
    writer.write_all(document_xml.as_bytes())?;

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn render_document_xml(text: &str) -> String {
    let mut xml = String::with_capacity(text.len() * 2 + 512);
    xml.push_str(DOCUMENT_HEADER);
    for chunk in text.split(BLOCK_SEPARATOR) {
        push_paragraph(&mut xml, chunk.trim());
    }
    xml.push_str(DOCUMENT_FOOTER);
    xml
}

fn push_paragraph(xml: &mut String, paragraph: &str) {
    let cleaned = strip_control_chars(paragraph);
    if cleaned.is_empty() {
        xml.push_str("<w:p/>");
        return;
    }

    xml.push_str("<w:p><w:r>");
    for (i, line) in cleaned.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape(segment));
                xml.push_str("</w:t>");
            }
        }
    }
    xml.push_str("</w:r></w:p>");
}

// XML 1.0 forbids most C0 controls
fn strip_control_chars(s: &str) -> String {
    s.replace("\r\n", "\n")
        .chars()
        .map(|c| if c == '\r' { '\n' } else { c })
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
