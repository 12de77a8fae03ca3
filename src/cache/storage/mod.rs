//! Blob Storage Backends
//!
//! The cache keeps each tier's bytes in its own namespace of a blob store.
//! Backends only move bytes; all accounting lives in the cache index.

mod local;
mod memory;

pub use local::{LocalBlobStore, LocalBlobStoreConfig};
pub use memory::MemoryBlobStore;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

// =============================================================================
// BlobStore Trait
// =============================================================================

/// Hierarchical blob store: named namespaces holding named blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether the host exposes the storage primitive this backend needs.
    ///
    /// Must be cheap and must not create anything.
    fn is_supported(&self) -> bool;

    /// Create the namespace if it does not exist
    async fn ensure_namespace(&self, namespace: &str) -> Result<()>;

    /// Create or overwrite a blob
    async fn write(&self, namespace: &str, name: &str, data: Bytes) -> Result<()>;

    /// Read a blob
    ///
    /// Returns `Error::BlobNotFound` if it does not exist.
    async fn read(&self, namespace: &str, name: &str) -> Result<Bytes>;

    /// Delete a blob
    ///
    /// Returns false if the blob was already absent.
    async fn delete(&self, namespace: &str, name: &str) -> Result<bool>;

    /// Check whether a blob exists
    async fn exists(&self, namespace: &str, name: &str) -> Result<bool>;

    /// Copy a blob into another namespace under the same name.
    ///
    /// The source is left in place; callers delete it once the copy is
    /// confirmed.
    async fn copy(&self, from_namespace: &str, to_namespace: &str, name: &str) -> Result<()> {
        let data = self.read(from_namespace, name).await?;
        self.write(to_namespace, name, data).await
    }

    /// Check if storage is available/healthy
    async fn health_check(&self) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    /// Behavior every backend must share
    async fn exercise_contract(store: &dyn BlobStore) {
        assert!(store.is_supported());
        store.ensure_namespace("hot").await.unwrap();
        store.ensure_namespace("warm").await.unwrap();
        // Idempotent
        store.ensure_namespace("hot").await.unwrap();

        store.write("hot", "a", Bytes::from_static(b"one")).await.unwrap();
        store.write("hot", "a", Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(store.read("hot", "a").await.unwrap().as_ref(), b"two");
        assert!(store.exists("hot", "a").await.unwrap());
        assert!(!store.exists("warm", "a").await.unwrap());

        store.copy("hot", "warm", "a").await.unwrap();
        assert_eq!(store.read("warm", "a").await.unwrap().as_ref(), b"two");
        assert!(store.exists("hot", "a").await.unwrap());

        assert!(store.delete("hot", "a").await.unwrap());
        assert!(!store.delete("hot", "a").await.unwrap());
        assert_matches!(
            store.read("hot", "a").await,
            Err(Error::BlobNotFound { .. })
        );
        assert!(store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_contract() {
        exercise_contract(&MemoryBlobStore::new()).await;
    }

    #[tokio::test]
    async fn test_local_contract() {
        let tmp = TempDir::new().unwrap();
        let store = LocalBlobStore::new(tmp.path());
        exercise_contract(&store).await;
    }
}
