//! In-memory record registry
//!
//! One coarse lock guards the record map. It is only held for map reads
//! and writes; file I/O happens before the write lock is taken, so a
//! failed write never leaves a record behind.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use shared_types::{
    AssessmentReport, DocumentFormat, DocumentId, DocumentRecord, DocumentStatus,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ReviewError;
use crate::sanitize::sanitize_filename;
use crate::store::BlobStore;

pub struct Registry {
    store: BlobStore,
    records: RwLock<HashMap<DocumentId, DocumentRecord>>,
}

impl Registry {
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Store an uploaded file and register it as `uploaded`
    pub async fn create(
        &self,
        bytes: &[u8],
        display_name: &str,
        guidelines: Option<String>,
    ) -> Result<DocumentId, ReviewError> {
        let display_name = sanitize_filename(display_name);
        let format = DocumentFormat::from_path(Path::new(&display_name))?;

        let id = DocumentId::new();
        let storage_path = self.store.path_for(&id, &display_name);
        self.store.write(&storage_path, bytes).await?;

        let now = Utc::now();
        let record = DocumentRecord {
            id,
            storage_path,
            display_name,
            guidelines,
            status: DocumentStatus::Uploaded,
            last_report: None,
            origin_id: None,
            source_format: format,
            created_at: now,
            updated_at: now,
        };

        info!(document_id = %id, filename = %record.display_name, "Registered upload");
        self.records.write().await.insert(id, record);
        Ok(id)
    }

    /// Snapshot of a record
    pub async fn get(&self, id: &DocumentId) -> Result<DocumentRecord, ReviewError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(ReviewError::NotFound(*id))
    }

    /// Attach a report and advance the status
    ///
    /// `uploaded` and `assessed` records become `assessed`; a `modified`
    /// record keeps its status.
    pub async fn record_assessment(
        &self,
        id: &DocumentId,
        report: AssessmentReport,
    ) -> Result<DocumentRecord, ReviewError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or(ReviewError::NotFound(*id))?;

        record.status = record.status.after_assessment();
        record.last_report = Some(report);
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    /// Store a generated file and register it as `modified`, pointing back at its origin
    pub async fn create_derived(
        &self,
        origin_id: &DocumentId,
        bytes: &[u8],
        display_name: &str,
        source_format: DocumentFormat,
    ) -> Result<DocumentId, ReviewError> {
        if !self.records.read().await.contains_key(origin_id) {
            return Err(ReviewError::NotFound(*origin_id));
        }

        let display_name = sanitize_filename(display_name);
        let id = DocumentId::new();
        let storage_path = self.store.path_for(&id, &display_name);
        self.store.write(&storage_path, bytes).await?;

        let now = Utc::now();
        let record = DocumentRecord {
            id,
            storage_path,
            display_name,
            guidelines: None,
            status: DocumentStatus::Modified,
            last_report: None,
            origin_id: Some(*origin_id),
            source_format,
            created_at: now,
            updated_at: now,
        };

        info!(document_id = %id, origin_id = %origin_id, "Registered modified document");
        self.records.write().await.insert(id, record);
        Ok(id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{AiStatus, GrammarReport};
    use tempfile::TempDir;

    async fn registry() -> (TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();
        (dir, Registry::new(store))
    }

    fn report() -> AssessmentReport {
        AssessmentReport::combined(GrammarReport::empty(), "ok".to_string(), AiStatus::Ok)
    }

    #[tokio::test]
    async fn test_create_then_get_is_uploaded() {
        let (_dir, registry) = registry().await;
        let id = registry
            .create(b"bytes", "My Policy.pdf", Some("Be formal".to_string()))
            .await
            .unwrap();

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.status, DocumentStatus::Uploaded);
        assert_eq!(record.display_name, "My_Policy.pdf");
        assert_eq!(record.guidelines.as_deref(), Some("Be formal"));
        assert_eq!(record.source_format, DocumentFormat::Pdf);
        assert!(record.last_report.is_none());
        assert!(record.origin_id.is_none());
        assert_eq!(std::fs::read(&record.storage_path).unwrap(), b"bytes");
        assert!(record
            .storage_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(&id.to_string()));
    }

    #[tokio::test]
    async fn test_create_mints_fresh_ids() {
        let (_dir, registry) = registry().await;
        let a = registry.create(b"a", "same.docx", None).await.unwrap();
        let b = registry.create(b"b", "same.docx", None).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);

        let path_a = registry.get(&a).await.unwrap().storage_path;
        let path_b = registry.get(&b).await.unwrap().storage_path;
        assert_ne!(path_a, path_b);
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_extension() {
        let (_dir, registry) = registry().await;
        let err = registry.create(b"x", "notes.txt", None).await.unwrap_err();
        assert!(matches!(err, ReviewError::UnsupportedFormat(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_write_inserts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = BlobStore::open(&root).await.unwrap();
        let registry = Registry::new(store);
        std::fs::remove_dir_all(&root).unwrap();

        let err = registry.create(b"x", "a.pdf", None).await.unwrap_err();
        assert!(matches!(err, ReviewError::Storage(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let (_dir, registry) = registry().await;
        let id = DocumentId::new();
        assert!(matches!(
            registry.get(&id).await,
            Err(ReviewError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_record_assessment_advances_and_is_idempotent() {
        let (_dir, registry) = registry().await;
        let id = registry.create(b"x", "a.docx", None).await.unwrap();

        let first = registry.record_assessment(&id, report()).await.unwrap();
        assert_eq!(first.status, DocumentStatus::Assessed);
        assert_eq!(first.last_report, Some(report()));

        let second = registry.record_assessment(&id, report()).await.unwrap();
        assert_eq!(second.status, DocumentStatus::Assessed);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_record_assessment_unknown_inserts_nothing() {
        let (_dir, registry) = registry().await;
        let err = registry
            .record_assessment(&DocumentId::new(), report())
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(_)));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_derived_links_origin() {
        let (_dir, registry) = registry().await;
        let origin = registry
            .create(b"x", "contract.docx", Some("g".to_string()))
            .await
            .unwrap();

        let derived = registry
            .create_derived(&origin, b"y", "contract_modified.docx", DocumentFormat::Docx)
            .await
            .unwrap();
        assert_ne!(derived, origin);

        let record = registry.get(&derived).await.unwrap();
        assert_eq!(record.status, DocumentStatus::Modified);
        assert_eq!(record.origin_id, Some(origin));
        assert_eq!(record.source_format, DocumentFormat::Docx);
        assert_eq!(record.display_name, "contract_modified.docx");
        assert!(record.guidelines.is_none());

        let origin_record = registry.get(&origin).await.unwrap();
        assert_eq!(origin_record.status, DocumentStatus::Uploaded);
        assert_eq!(origin_record.guidelines.as_deref(), Some("g"));
    }

    #[tokio::test]
    async fn test_assessing_modified_keeps_status() {
        let (_dir, registry) = registry().await;
        let origin = registry.create(b"x", "a.pdf", None).await.unwrap();
        let derived = registry
            .create_derived(&origin, b"y", "a_modified.pdf", DocumentFormat::Pdf)
            .await
            .unwrap();

        let record = registry.record_assessment(&derived, report()).await.unwrap();
        assert_eq!(record.status, DocumentStatus::Modified);
        assert!(record.last_report.is_some());
    }

    #[tokio::test]
    async fn test_create_derived_unknown_origin_writes_nothing() {
        let (dir, registry) = registry().await;
        let err = registry
            .create_derived(&DocumentId::new(), b"y", "x_modified.pdf", DocumentFormat::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(_)));
        assert!(registry.is_empty().await);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
