use shared_types::UnsupportedFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFormat),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<zip::result::ZipError> for FormatError {
    fn from(err: zip::result::ZipError) -> Self {
        FormatError::Docx(err.to_string())
    }
}

impl From<quick_xml::Error> for FormatError {
    fn from(err: quick_xml::Error) -> Self {
        FormatError::Docx(format!("Malformed document XML: {}", err))
    }
}
