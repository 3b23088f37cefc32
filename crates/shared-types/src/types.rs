use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::report::AssessmentReport;

/// Extensions accepted for upload and extraction, lowercase with leading dot
pub const ALLOWED_EXTENSIONS: &[&str] = &[".docx", ".pdf"];

/// Opaque identifier of a document record, minted once and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle status of a record
///
/// Uploads start at `Uploaded` and may advance to `Assessed`. Records produced
/// by a modification are created directly as `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Assessed,
    Modified,
}

impl DocumentStatus {
    /// Status after an assessment is recorded. Never moves backwards.
    pub fn after_assessment(self) -> Self {
        match self {
            DocumentStatus::Uploaded | DocumentStatus::Assessed => DocumentStatus::Assessed,
            DocumentStatus::Modified => DocumentStatus::Modified,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Uploaded => write!(f, "uploaded"),
            DocumentStatus::Assessed => write!(f, "assessed"),
            DocumentStatus::Modified => write!(f, "modified"),
        }
    }
}

/// Extension outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unsupported file type: {extension}. Allowed types: {}",
    ALLOWED_EXTENSIONS.join(", ")
)]
pub struct UnsupportedFormat {
    pub extension: String,
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Parse an extension such as `".DOCX"`, `"pdf"` (case-insensitive, dot optional)
    pub fn from_extension(ext: &str) -> Result<Self, UnsupportedFormat> {
        let normalized = ext.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            _ => Err(UnsupportedFormat {
                extension: if normalized.is_empty() {
                    String::new()
                } else {
                    format!(".{}", normalized)
                },
            }),
        }
    }

    /// Dispatch solely on the path's extension
    pub fn from_path(path: &Path) -> Result<Self, UnsupportedFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    /// Extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Format a rewritten document is synthesized as: DOCX stays DOCX,
    /// everything else becomes PDF.
    pub fn synthesis_target(origin: Option<DocumentFormat>) -> DocumentFormat {
        match origin {
            Some(DocumentFormat::Docx) => DocumentFormat::Docx,
            _ => DocumentFormat::Pdf,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One uploaded or generated file tracked by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    /// Backing file, owned by this record only
    pub storage_path: PathBuf,
    /// Sanitized filename used for downloads and derived names
    pub display_name: String,
    /// Set at upload, never mutated
    pub guidelines: Option<String>,
    pub status: DocumentStatus,
    pub last_report: Option<AssessmentReport>,
    /// Record this one was derived from (lookup only)
    pub origin_id: Option<DocumentId>,
    pub source_format: DocumentFormat,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Format of the backing file, from its own extension
    pub fn file_format(&self) -> Result<DocumentFormat, UnsupportedFormat> {
        DocumentFormat::from_path(&self.storage_path)
    }

    /// Display name without its final extension
    pub fn display_stem(&self) -> &str {
        Path::new(&self.display_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.display_name)
    }
}
