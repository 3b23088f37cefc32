//! Upload, assess, modify and download workflows over the registry
//!
//! Every operation reads a snapshot of the record, does the slow work
//! (extraction, grammar, provider calls, synthesis) without holding the
//! registry lock, then commits the result in one short write. A failure
//! anywhere before the commit leaves the registry untouched.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compliance_engine::ComplianceEngine;
use shared_types::{AssessmentReport, DocumentFormat, DocumentId, DocumentRecord};
use tracing::{info, warn};

use crate::error::ReviewError;
use crate::registry::Registry;
use crate::sanitize::derived_display_name;

/// Longest accepted guidelines text, in characters
pub const MAX_GUIDELINES_CHARS: usize = 500;

/// A stored file ready to be sent to a client
#[derive(Debug, Clone)]
pub struct Download {
    pub record: DocumentRecord,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone)]
pub struct ReviewService {
    registry: Arc<Registry>,
    engine: ComplianceEngine,
}

impl ReviewService {
    pub fn new(registry: Arc<Registry>, engine: ComplianceEngine) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    /// Validate and store an uploaded file
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        guidelines: Option<String>,
    ) -> Result<DocumentRecord, ReviewError> {
        if file_name.trim().is_empty() {
            return Err(ReviewError::Validation("File missing".to_string()));
        }
        if bytes.is_empty() {
            return Err(ReviewError::Validation("Uploaded file is empty".to_string()));
        }
        DocumentFormat::from_path(Path::new(file_name.trim()))?;

        let guidelines = guidelines.filter(|g| !g.trim().is_empty());
        if let Some(g) = &guidelines {
            if g.chars().count() > MAX_GUIDELINES_CHARS {
                return Err(ReviewError::Validation(format!(
                    "Guidelines must be at most {} characters",
                    MAX_GUIDELINES_CHARS
                )));
            }
        }

        let id = self.registry.create(bytes, file_name, guidelines).await?;
        self.registry.get(&id).await
    }

    /// Run grammar and AI assessment on a stored document
    pub async fn assess(
        &self,
        id: &DocumentId,
    ) -> Result<(DocumentRecord, AssessmentReport), ReviewError> {
        let record = self.registry.get(id).await?;
        self.ensure_blob(&record).await?;

        let text = extract(&record).await?;
        let report = self
            .engine
            .evaluate(&text, record.guidelines.as_deref())
            .await?;

        let updated = self.registry.record_assessment(id, report.clone()).await?;
        info!(
            document_id = %id,
            status = %updated.status,
            grammar_issues = report.grammar.issue_count,
            "Document assessed"
        );
        Ok((updated, report))
    }

    /// Rewrite a document per instruction and store the result as a new record
    ///
    /// When the provider yields no usable text the original extracted text
    /// is written out unchanged.
    pub async fn modify(
        &self,
        id: &DocumentId,
        instruction: &str,
    ) -> Result<DocumentRecord, ReviewError> {
        if instruction.trim().is_empty() {
            return Err(ReviewError::Validation(
                "Instruction must not be empty".to_string(),
            ));
        }

        let record = self.registry.get(id).await?;
        self.ensure_blob(&record).await?;

        let original = extract(&record).await?;
        if original.trim().is_empty() {
            return Err(ReviewError::EmptyExtraction);
        }

        let outcome = self.engine.rewrite(&original, instruction).await;
        let rewritten = match outcome.content() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => {
                warn!(
                    document_id = %id,
                    ai_status = ?outcome.status(),
                    "No rewrite available, keeping original text"
                );
                original
            }
        };

        let target = DocumentFormat::synthesis_target(record.file_format().ok());
        let bytes =
            tokio::task::spawn_blocking(move || document_formats::synthesize(target, &rewritten))
                .await??;

        let display_name = derived_display_name(record.display_stem(), target);
        let new_id = self
            .registry
            .create_derived(id, &bytes, &display_name, record.source_format)
            .await?;

        info!(document_id = %new_id, origin_id = %id, "Document modified");
        self.registry.get(&new_id).await
    }

    /// Read a stored file for download
    pub async fn open_download(&self, id: &DocumentId) -> Result<Download, ReviewError> {
        let record = self.registry.get(id).await?;
        let bytes = self
            .registry
            .store()
            .read(&record.storage_path)
            .await
            .map_err(|e| blob_error(&record, e))?;

        let content_type = mime_guess::from_path(&record.display_name)
            .first_or_octet_stream()
            .to_string();

        Ok(Download {
            record,
            bytes,
            content_type,
        })
    }

    async fn ensure_blob(&self, record: &DocumentRecord) -> Result<(), ReviewError> {
        if self.registry.store().exists(&record.storage_path).await {
            Ok(())
        } else {
            warn!(
                document_id = %record.id,
                path = %record.storage_path.display(),
                "Backing file missing"
            );
            Err(ReviewError::BlobMissing(record.id))
        }
    }
}

async fn extract(record: &DocumentRecord) -> Result<String, ReviewError> {
    let path: PathBuf = record.storage_path.clone();
    let result =
        tokio::task::spawn_blocking(move || document_formats::extract_file(&path)).await?;
    match result {
        Ok(text) => Ok(text),
        Err(document_formats::FormatError::Io(e)) => Err(blob_error(record, e)),
        Err(e) => Err(e.into()),
    }
}

fn blob_error(record: &DocumentRecord, err: io::Error) -> ReviewError {
    if err.kind() == io::ErrorKind::NotFound {
        ReviewError::BlobMissing(record.id)
    } else {
        ReviewError::Storage(err)
    }
}
