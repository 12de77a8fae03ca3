//! In-Memory Blob Store
//!
//! DashMap-backed store for tests and ephemeral caches. Supports failure
//! injection so callers can exercise degraded paths.

use crate::cache::storage::BlobStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Blob store holding everything in process memory
pub struct MemoryBlobStore {
    /// (namespace, name) -> bytes
    blobs: DashMap<(String, String), Bytes>,
    namespaces: DashSet<String>,
    supported: bool,
    available: AtomicBool,
    /// Namespaces that reject writes
    failing_writes: DashSet<String>,
    /// Namespaces that reject deletes
    failing_deletes: DashSet<String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
            namespaces: DashSet::new(),
            supported: true,
            available: AtomicBool::new(true),
            failing_writes: DashSet::new(),
            failing_deletes: DashSet::new(),
        }
    }

    /// A store whose capability probe fails and which rejects every call
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Toggle availability; while unavailable every I/O call fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make writes into `namespace` fail (or succeed again)
    pub fn fail_writes_to(&self, namespace: &str, fail: bool) {
        if fail {
            self.failing_writes.insert(namespace.to_string());
        } else {
            self.failing_writes.remove(namespace);
        }
    }

    /// Make deletes from `namespace` fail (or succeed again)
    pub fn fail_deletes_from(&self, namespace: &str, fail: bool) {
        if fail {
            self.failing_deletes.insert(namespace.to_string());
        } else {
            self.failing_deletes.remove(namespace);
        }
    }

    /// Number of blobs held in `namespace`
    pub fn blob_count(&self, namespace: &str) -> usize {
        self.blobs.iter().filter(|b| b.key().0 == namespace).count()
    }

    /// Total bytes held in `namespace`
    pub fn namespace_bytes(&self, namespace: &str) -> u64 {
        self.blobs
            .iter()
            .filter(|b| b.key().0 == namespace)
            .map(|b| b.value().len() as u64)
            .sum()
    }

    fn check(&self, namespace: &str) -> Result<()> {
        if !self.supported || !self.available.load(Ordering::SeqCst) {
            return Err(Error::BlobStoreUnavailable("memory blob store offline".into()));
        }
        if !self.namespaces.contains(namespace) {
            return Err(Error::BlobStoreUnavailable(format!(
                "namespace '{}' does not exist",
                namespace
            )));
        }
        Ok(())
    }

    fn key(namespace: &str, name: &str) -> (String, String) {
        (namespace.to_string(), name.to_string())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        if !self.supported || !self.available.load(Ordering::SeqCst) {
            return Err(Error::BlobStoreUnavailable("memory blob store offline".into()));
        }
        self.namespaces.insert(namespace.to_string());
        Ok(())
    }

    async fn write(&self, namespace: &str, name: &str, data: Bytes) -> Result<()> {
        self.check(namespace)?;
        if self.failing_writes.contains(namespace) {
            return Err(Error::BlobStoreUnavailable(format!(
                "writes to '{}' are failing",
                namespace
            )));
        }
        self.blobs.insert(Self::key(namespace, name), data);
        Ok(())
    }

    async fn read(&self, namespace: &str, name: &str) -> Result<Bytes> {
        self.check(namespace)?;
        self.blobs
            .get(&Self::key(namespace, name))
            .map(|b| b.value().clone())
            .ok_or_else(|| Error::BlobNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<bool> {
        self.check(namespace)?;
        if self.failing_deletes.contains(namespace) {
            return Err(Error::BlobStoreUnavailable(format!(
                "deletes from '{}' are failing",
                namespace
            )));
        }
        Ok(self.blobs.remove(&Self::key(namespace, name)).is_some())
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool> {
        self.check(namespace)?;
        Ok(self.blobs.contains_key(&Self::key(namespace, name)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.supported && self.available.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_unsupported_store() {
        let store = MemoryBlobStore::unsupported();
        assert!(!store.is_supported());
        assert!(store.ensure_namespace("hot").await.is_err());
        assert!(!store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_requires_namespace() {
        let store = MemoryBlobStore::new();
        let result = store.write("hot", "a", Bytes::from_static(b"x")).await;
        assert_matches!(result, Err(Error::BlobStoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryBlobStore::new();
        store.ensure_namespace("warm").await.unwrap();

        store.fail_writes_to("warm", true);
        assert!(store.write("warm", "a", Bytes::from_static(b"x")).await.is_err());
        store.fail_writes_to("warm", false);
        store.write("warm", "a", Bytes::from_static(b"xy")).await.unwrap();

        store.fail_deletes_from("warm", true);
        assert!(store.delete("warm", "a").await.is_err());
        assert_eq!(store.blob_count("warm"), 1);
        assert_eq!(store.namespace_bytes("warm"), 2);

        store.set_available(false);
        assert!(store.read("warm", "a").await.is_err());
        assert!(!store.health_check().await.unwrap());
    }
}
