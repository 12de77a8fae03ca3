//! Cache Index
//!
//! The index maps logical paths to entry metadata and is the single source
//! of truth for tier membership and usage. It is persisted as one JSON
//! document through an [`IndexStore`].

use crate::cache::entry::CacheEntry;
use crate::cache::tier::CacheTier;
use crate::error::{Error, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Fixed key the cache index is persisted under
pub const INDEX_KEY: &str = "tiered-file-cache-index";

/// Current on-disk index format
pub const INDEX_FORMAT_VERSION: u32 = 1;

// =============================================================================
// IndexStore Trait
// =============================================================================

/// Persistent key/value store holding serialized documents
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Load the document stored under `key`
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store (create or overwrite) the document under `key`
    async fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the document under `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

// =============================================================================
// File Index Store
// =============================================================================

/// Index store writing one `<key>.json` file per key
pub struct FileIndexStore {
    dir: PathBuf,
}

impl FileIndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl IndexStore for FileIndexStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.file_path(key)).await {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        // Write to a sibling then rename so readers never see a partial file
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Index Store
// =============================================================================

/// In-process index store, mainly for tests and ephemeral caches
#[derive(Default)]
pub struct MemoryIndexStore {
    documents: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability; while unavailable every call fails
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(Error::IndexStore("memory index store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.documents.read().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.documents.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.documents.write().remove(key);
        Ok(())
    }
}

// =============================================================================
// Cache Index
// =============================================================================

/// In-memory view of the persisted index
///
/// Entries keep insertion order, which breaks ties between equal
/// `last_accessed` timestamps during eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    version: u32,
    entries: IndexMap<String, CacheEntry>,
}

impl Default for CacheIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheIndex {
    pub fn new() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            entries: IndexMap::new(),
        }
    }

    /// Decode a persisted document
    pub fn from_json(json: &str) -> Result<Self> {
        let index: CacheIndex = serde_json::from_str(json)?;
        if index.version > INDEX_FORMAT_VERSION {
            return Err(Error::IndexStore(format!(
                "index format version {} is newer than supported {}",
                index.version, INDEX_FORMAT_VERSION
            )));
        }
        Ok(index)
    }

    /// Encode for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, path: &str) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert or overwrite the entry for its path, returning the previous one.
    ///
    /// Overwrites keep the entry's original position in the index.
    pub fn upsert(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(entry.path.clone(), entry)
    }

    /// Remove an entry, preserving the order of the rest
    pub fn remove(&mut self, path: &str) -> Option<CacheEntry> {
        self.entries.shift_remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn entries_in(&self, tier: CacheTier) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values().filter(move |e| e.tier == tier)
    }

    /// Sum of sizes of entries in `tier`
    pub fn tier_usage(&self, tier: CacheTier) -> u64 {
        self.entries_in(tier).map(|e| e.size).sum()
    }

    /// Sum of sizes of all entries
    pub fn total_usage(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }

    /// Paths in `tier` ordered least recently used first (stable on ties)
    pub fn lru_order(&self, tier: CacheTier) -> Vec<String> {
        let mut candidates: Vec<&CacheEntry> = self.entries_in(tier).collect();
        candidates.sort_by_key(|e| e.last_accessed);
        candidates.into_iter().map(|e| e.path.clone()).collect()
    }
}
