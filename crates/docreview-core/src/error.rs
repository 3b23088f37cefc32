use compliance_engine::GrammarError;
use document_formats::FormatError;
use shared_types::{DocumentId, UnsupportedFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("File for document {0} not found on server")]
    BlobMissing(DocumentId),

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Text extraction failed: {0}")]
    Format(FormatError),

    #[error("Grammar check failed: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Document text could not be extracted")]
    EmptyExtraction,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FormatError> for ReviewError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Unsupported(e) => ReviewError::UnsupportedFormat(e),
            other => ReviewError::Format(other),
        }
    }
}

impl From<tokio::task::JoinError> for ReviewError {
    fn from(err: tokio::task::JoinError) -> Self {
        ReviewError::Internal(format!("Background task failed: {}", err))
    }
}
