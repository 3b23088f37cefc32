//! Flat-directory storage for document files

use std::io;
use std::path::{Path, PathBuf};

use shared_types::DocumentId;
use tracing::debug;

/// Upload directory holding one file per record
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open the store, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File location for a record, scoped by its id
    pub fn path_for(&self, id: &DocumentId, display_name: &str) -> PathBuf {
        self.root.join(format!("{}_{}", id, display_name))
    }

    pub async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored file");
        Ok(())
    }

    pub async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
