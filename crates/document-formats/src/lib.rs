//! Text extraction and document synthesis for DOCX and PDF
//!
//! Each supported [`DocumentFormat`] maps to a fixed pair of functions:
//! one that turns file bytes into plain text, and one that renders plain
//! text into a fresh file of that format. Unknown extensions never reach
//! the table; they are rejected with [`UnsupportedFormat`] when the format
//! is resolved from a path.
//!
//! [`UnsupportedFormat`]: shared_types::UnsupportedFormat

pub mod docx;
pub mod error;
pub mod pdf;

use std::path::Path;

pub use error::FormatError;
pub use shared_types::DocumentFormat;

/// Separator between paragraphs (DOCX) or pages (PDF) in extracted text
pub const BLOCK_SEPARATOR: &str = "\n\n";

struct FormatHandler {
    extract: fn(&[u8]) -> Result<String, FormatError>,
    synthesize: fn(&str) -> Result<Vec<u8>, FormatError>,
}

const DOCX_HANDLER: FormatHandler = FormatHandler {
    extract: docx::extract_text,
    synthesize: docx::synthesize,
};

const PDF_HANDLER: FormatHandler = FormatHandler {
    extract: extract_pdf,
    synthesize: pdf::synthesize,
};

fn handler(format: DocumentFormat) -> &'static FormatHandler {
    match format {
        DocumentFormat::Docx => &DOCX_HANDLER,
        DocumentFormat::Pdf => &PDF_HANDLER,
    }
}

// PDF extraction degrades to empty text instead of failing
fn extract_pdf(bytes: &[u8]) -> Result<String, FormatError> {
    Ok(pdf::extract_text(bytes))
}

/// Extract plain text from in-memory document bytes
pub fn extract(format: DocumentFormat, bytes: &[u8]) -> Result<String, FormatError> {
    (handler(format).extract)(bytes)
}

/// Extract plain text from a stored file, dispatching on its extension
pub fn extract_file(path: &Path) -> Result<String, FormatError> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    extract(format, &bytes)
}

/// Render plain text into a new document of the given format
pub fn synthesize(format: DocumentFormat, text: &str) -> Result<Vec<u8>, FormatError> {
    (handler(format).synthesize)(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_file_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").unwrap();

        let err = extract_file(&path).unwrap_err();
        match err {
            FormatError::Unsupported(e) => assert_eq!(e.extension, ".txt"),
            other => panic!("expected unsupported format, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_file_dispatches_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("REPORT.DOCX");
        let bytes = synthesize(DocumentFormat::Docx, "Alpha\n\nBeta").unwrap();
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(extract_file(&path).unwrap(), "Alpha\n\nBeta");
    }

    #[test]
    fn test_extract_file_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_file(&dir.path().join("gone.pdf")).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn test_docx_resynthesis_is_stable() {
        let text = "First paragraph.\n\nSecond paragraph with more words.\n\nThird.";
        let bytes = synthesize(DocumentFormat::Docx, text).unwrap();
        let extracted = extract(DocumentFormat::Docx, &bytes).unwrap();
        assert_eq!(extracted, text);

        let again = synthesize(DocumentFormat::Docx, &extracted).unwrap();
        assert_eq!(extract(DocumentFormat::Docx, &again).unwrap(), extracted);
    }

    #[test]
    fn test_pdf_resynthesis_keeps_paragraph_content() {
        let text = "Compliance summary.\n\nAll sections reviewed.";
        let bytes = synthesize(DocumentFormat::Pdf, text).unwrap();
        let extracted = extract(DocumentFormat::Pdf, &bytes).unwrap();

        assert!(extracted.contains("Compliance summary."));
        assert!(extracted.contains("All sections reviewed."));
    }
}
