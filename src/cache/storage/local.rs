//! Local Filesystem Blob Store
//!
//! One directory per namespace under a root directory, one file per blob.

use crate::cache::storage::BlobStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

// =============================================================================
// Local Blob Store Configuration
// =============================================================================

/// Configuration for the local blob store
#[derive(Debug, Clone)]
pub struct LocalBlobStoreConfig {
    /// Root directory holding one sub-directory per namespace
    pub root_path: PathBuf,
    /// Whether to fsync each blob before it is renamed into place
    pub sync_writes: bool,
}

impl Default for LocalBlobStoreConfig {
    fn default() -> Self {
        Self {
            root_path: std::env::temp_dir().join("tiered-file-cache"),
            sync_writes: true,
        }
    }
}

// =============================================================================
// Local Blob Store
// =============================================================================

/// Blob store backed by a local directory tree
pub struct LocalBlobStore {
    root_path: PathBuf,
    sync_writes: bool,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`; nothing is created until used
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self::with_config(LocalBlobStoreConfig {
            root_path: root_path.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: LocalBlobStoreConfig) -> Self {
        Self {
            root_path: config.root_path,
            sync_writes: config.sync_writes,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.root_path.join(namespace)
    }

    fn blob_path(&self, namespace: &str, name: &str) -> PathBuf {
        self.namespace_path(namespace).join(name)
    }

    /// Staging file for a blob write. Physical names end in a hex digest,
    /// so the suffix never collides with a real blob.
    fn tmp_path(&self, namespace: &str, name: &str) -> PathBuf {
        self.namespace_path(namespace).join(format!("{}.tmp", name))
    }

    async fn write_tmp(&self, tmp_path: &Path, data: &[u8]) -> Result<()> {
        let mut file = fs::File::create(tmp_path).await?;
        file.write_all(data).await?;
        if self.sync_writes {
            file.sync_all().await?;
        }
        Ok(())
    }

    /// Closest existing ancestor of the root (the root itself if present)
    fn existing_ancestor(&self) -> Option<&Path> {
        self.root_path.ancestors().find(|p| p.exists())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn is_supported(&self) -> bool {
        match self.existing_ancestor().map(std::fs::metadata) {
            Some(Ok(meta)) => meta.is_dir() && !meta.permissions().readonly(),
            _ => false,
        }
    }

    async fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        fs::create_dir_all(self.namespace_path(namespace)).await?;
        Ok(())
    }

    async fn write(&self, namespace: &str, name: &str, data: Bytes) -> Result<()> {
        // Written beside the blob and renamed over it, so a failed write
        // never clobbers the bytes an index entry still points at
        let path = self.blob_path(namespace, name);
        let tmp_path = self.tmp_path(namespace, name);
        if let Err(e) = self.write_tmp(&tmp_path, &data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn read(&self, namespace: &str, name: &str) -> Result<Bytes> {
        match fs::read(self.blob_path(namespace, name)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlobNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<bool> {
        match fs::remove_file(self.blob_path(namespace, name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        Ok(fs::try_exists(self.blob_path(namespace, name)).await?)
    }

    async fn copy(&self, from_namespace: &str, to_namespace: &str, name: &str) -> Result<()> {
        let from = self.blob_path(from_namespace, name);
        let to = self.blob_path(to_namespace, name);
        match fs::copy(&from, &to).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound && !from.exists() => Err(Error::BlobNotFound {
                namespace: from_namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        // Check that the root exists and is writable
        fs::create_dir_all(&self.root_path).await?;
        let test_path = self.root_path.join(".health_check");
        match fs::write(&test_path, b"ok").await {
            Ok(_) => {
                let _ = fs::remove_file(&test_path).await;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}
