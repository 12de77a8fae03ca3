//! Tiered File Cache Manager
//!
//! Coordinates the blob store, the persisted index, eviction, demotion and
//! promotion. Public operations never return errors: failures are logged
//! and surface as `None`, `false` or empty results.

use crate::cache::config::{CacheConfig, QuotaMode};
use crate::cache::entry::{
    determine_tier, CacheEntry, FileData, FileInfo, StoreOptions, DEFAULT_PRIORITY,
};
use crate::cache::events::{CacheEvent, EvictionReason};
use crate::cache::index::{CacheIndex, FileIndexStore, IndexStore, MemoryIndexStore, INDEX_KEY};
use crate::cache::metrics::{CacheMetrics, MetricsSnapshot};
use crate::cache::storage::{BlobStore, LocalBlobStore, MemoryBlobStore};
use crate::cache::tier::CacheTier;
use crate::cache::FileCache;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Capacity of the event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

// =============================================================================
// Statistics
// =============================================================================

/// Usage of one tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Bytes held by entries in the tier
    pub used: u64,
    /// Tier byte budget
    pub max: u64,
    /// Entries in the tier
    pub count: usize,
}

/// Usage of every tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierStatsSet {
    pub hot: TierStats,
    pub warm: TierStats,
    pub cold: TierStats,
}

impl TierStatsSet {
    pub fn tier(&self, tier: CacheTier) -> &TierStats {
        match tier {
            CacheTier::Hot => &self.hot,
            CacheTier::Warm => &self.warm,
            CacheTier::Cold => &self.cold,
        }
    }

    fn tier_mut(&mut self, tier: CacheTier) -> &mut TierStats {
        match tier {
            CacheTier::Hot => &mut self.hot,
            CacheTier::Warm => &mut self.warm,
            CacheTier::Cold => &mut self.cold,
        }
    }
}

/// Snapshot returned by [`TieredFileCache::get_stats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Bytes held across all tiers
    pub total_used: u64,
    /// Configured overall quota
    pub quota: u64,
    /// Per-tier usage
    pub tiers: TierStatsSet,
    /// Number of indexed entries
    pub file_count: usize,
    /// Activity counters since construction
    pub counters: MetricsSnapshot,
}

/// Outcome of an age sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Entries moved one tier colder
    pub demoted: usize,
    /// Cold entries deleted
    pub deleted: usize,
    /// Entries that could not be moved or deleted
    pub failed: usize,
}

// =============================================================================
// Tiered File Cache
// =============================================================================

enum CacheState {
    Uninitialized,
    Ready(CacheIndex),
    Closed,
}

/// Bounded three-tier persistent file cache
///
/// Construct once at startup and share by reference (or `Arc`). All
/// operations take `&self` and are serialized internally.
pub struct TieredFileCache {
    blobs: Arc<dyn BlobStore>,
    index_store: Arc<dyn IndexStore>,
    config: CacheConfig,
    state: Mutex<CacheState>,
    metrics: CacheMetrics,
    event_tx: broadcast::Sender<CacheEvent>,
}

impl TieredFileCache {
    /// Create a cache over the given stores. No I/O happens until `init`
    /// or the first operation.
    pub fn new(
        config: CacheConfig,
        blobs: Arc<dyn BlobStore>,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            blobs,
            index_store,
            config,
            state: Mutex::new(CacheState::Uninitialized),
            metrics: CacheMetrics::new(),
            event_tx,
        }
    }

    /// Cache whose blobs and index live under `root` on the local filesystem
    pub fn local(root: impl Into<PathBuf>, config: CacheConfig) -> Self {
        let root = root.into();
        Self::new(
            config,
            Arc::new(LocalBlobStore::new(&root)),
            Arc::new(FileIndexStore::new(root)),
        )
    }

    /// Cache held entirely in process memory
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemoryIndexStore::new()),
        )
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Subscribe to cache events
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: CacheEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Whether the host exposes the storage primitive the cache needs
    pub fn is_supported(&self) -> bool {
        self.blobs.is_supported()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Initialize the cache: create tier namespaces, load and reconcile the
    /// index. Returns false on failure; later operations retry.
    ///
    /// Calling `init` on a closed cache reopens it.
    pub async fn init(&self) -> bool {
        let mut state = self.state.lock().await;
        if matches!(*state, CacheState::Closed) {
            *state = CacheState::Uninitialized;
        }
        match self.ready(&mut state).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Tiered file cache initialization failed");
                false
            }
        }
    }

    /// Persist the index and close the cache. Operations on a closed cache
    /// degrade like an unavailable one until `init` is called again.
    pub async fn close(&self) -> bool {
        let mut state = self.state.lock().await;
        let persisted = match &*state {
            CacheState::Ready(index) => match self.persist(index).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to persist cache index on close");
                    false
                }
            },
            _ => true,
        };
        *state = CacheState::Closed;
        info!("Tiered file cache closed");
        persisted
    }

    /// Resolve the ready index, initializing lazily
    async fn ready<'s>(&self, state: &'s mut CacheState) -> Result<&'s mut CacheIndex> {
        if let CacheState::Uninitialized = state {
            let index = self.open().await?;
            *state = CacheState::Ready(index);
        }
        match state {
            CacheState::Ready(index) => Ok(index),
            CacheState::Closed => Err(Error::Closed),
            CacheState::Uninitialized => Err(Error::NotInitialized),
        }
    }

    async fn open(&self) -> Result<CacheIndex> {
        if !self.blobs.is_supported() {
            return Err(Error::Unsupported(
                "blob store capability probe failed".into(),
            ));
        }

        for tier in CacheTier::all() {
            self.blobs.ensure_namespace(tier.as_str()).await?;
        }

        let mut index = match self.index_store.load(INDEX_KEY).await? {
            Some(json) => CacheIndex::from_json(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable cache index");
                CacheIndex::new()
            }),
            None => CacheIndex::new(),
        };

        let repaired = self.reconcile(&mut index).await?;
        if repaired > 0 {
            self.persist(&index).await?;
        }

        info!(
            entries = index.len(),
            repaired = repaired,
            used = index.total_usage(),
            "Tiered file cache initialized"
        );
        Ok(index)
    }

    /// Make every index entry point at the tier that actually holds its blob.
    ///
    /// Entries whose blob is found in another tier are re-pointed (an
    /// interrupted move); entries whose blob is gone are dropped.
    async fn reconcile(&self, index: &mut CacheIndex) -> Result<usize> {
        let snapshot: Vec<CacheEntry> = index.entries().cloned().collect();
        let mut repaired = 0;

        for entry in snapshot {
            if self.blobs.exists(entry.tier.as_str(), &entry.name).await? {
                continue;
            }

            let mut found = None;
            for tier in CacheTier::all() {
                if *tier != entry.tier && self.blobs.exists(tier.as_str(), &entry.name).await? {
                    found = Some(*tier);
                    break;
                }
            }

            match found {
                Some(tier) => {
                    warn!(path = %entry.path, indexed = %entry.tier, actual = %tier, "Re-pointing cache entry");
                    if let Some(e) = index.get_mut(&entry.path) {
                        e.tier = tier;
                    }
                }
                None => {
                    warn!(path = %entry.path, tier = %entry.tier, "Dropping cache entry with missing blob");
                    index.remove(&entry.path);
                }
            }
            repaired += 1;
        }

        Ok(repaired)
    }

    async fn persist(&self, index: &CacheIndex) -> Result<()> {
        let json = index.to_json()?;
        self.index_store.save(INDEX_KEY, &json).await
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Store `data` under `path`, replacing any previous entry.
    ///
    /// Returns the new entry, or `None` if the cache is unavailable or any
    /// step fails.
    pub async fn store_file(
        &self,
        path: &str,
        data: impl Into<FileData>,
        options: StoreOptions,
    ) -> Option<CacheEntry> {
        let data = data.into();
        let mut state = self.state.lock().await;
        let result = match self.ready(&mut state).await {
            Ok(index) => self.store_inner(index, path, data, options).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to store file");
                None
            }
        }
    }

    /// Read the bytes stored under `path`
    pub async fn get_file(&self, path: &str) -> Option<Bytes> {
        let mut state = self.state.lock().await;
        let result = match self.ready(&mut state).await {
            Ok(index) => self.get_inner(index, path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => None,
            Err(e) => {
                self.metrics.record_miss();
                warn!(path = %path, error = %e, "Failed to read file");
                None
            }
        }
    }

    /// Delete the entry for `path`.
    ///
    /// Returns false if the path is unknown or the blob could not be
    /// deleted; in the latter case the index entry is kept.
    pub async fn delete_file(&self, path: &str) -> bool {
        let mut state = self.state.lock().await;
        let result = match self.ready(&mut state).await {
            Ok(index) => self.delete_inner(index, path).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(path = %path, error = %e, "Failed to delete file");
            false
        })
    }

    /// Indexed entries, optionally restricted to one tier
    pub async fn list_files(&self, tier: Option<CacheTier>) -> Vec<CacheEntry> {
        self.with_index(Vec::new(), |index| {
            index
                .entries()
                .filter(|e| tier.map_or(true, |t| e.tier == t))
                .cloned()
                .collect()
        })
        .await
    }

    /// Entry metadata for `path`, without counting as an access
    pub async fn entry(&self, path: &str) -> Option<CacheEntry> {
        self.with_index(None, |index| index.get(path).cloned()).await
    }

    /// Whether `path` is indexed
    pub async fn contains(&self, path: &str) -> bool {
        self.with_index(false, |index| index.contains(path)).await
    }

    /// Bytes held by entries in `tier`
    pub async fn tier_usage(&self, tier: CacheTier) -> u64 {
        self.with_index(0, |index| index.tier_usage(tier)).await
    }

    /// Bytes held across all tiers
    pub async fn total_usage(&self) -> u64 {
        self.with_index(0, |index| index.total_usage()).await
    }

    /// Usage per tier, overall quota and activity counters
    pub async fn get_stats(&self) -> CacheStats {
        let mut state = self.state.lock().await;
        match self.ready(&mut state).await {
            Ok(index) => self.compute_stats(Some(index)),
            Err(e) => {
                warn!(error = %e, "Cache unavailable, reporting empty stats");
                self.compute_stats(None)
            }
        }
    }

    /// Demote every entry idle longer than its tier's max age; cold entries
    /// past their max age are deleted.
    pub async fn sweep_expired(&self) -> SweepReport {
        let mut state = self.state.lock().await;
        let result = match self.ready(&mut state).await {
            Ok(index) => self.sweep_inner(index).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "Age sweep failed");
            SweepReport::default()
        })
    }

    /// Delete every entry in `tier`
    pub async fn clear_tier(&self, tier: CacheTier) -> bool {
        let mut state = self.state.lock().await;
        let result = match self.ready(&mut state).await {
            Ok(index) => self.clear_tier_inner(index, tier).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(tier = %tier, error = %e, "Failed to clear tier");
            false
        })
    }

    /// Delete every entry in every tier
    pub async fn clear_all(&self) -> bool {
        let mut state = self.state.lock().await;
        let index = match self.ready(&mut state).await {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Failed to clear cache");
                return false;
            }
        };
        let mut ok = true;
        for tier in CacheTier::all() {
            if let Err(e) = self.clear_tier_inner(index, *tier).await {
                warn!(tier = %tier, error = %e, "Failed to clear tier");
                ok = false;
            }
        }
        ok
    }

    /// Check that the blob store is reachable
    pub async fn health_check(&self) -> bool {
        self.blobs.health_check().await.unwrap_or(false)
    }

    async fn with_index<T>(&self, fallback: T, f: impl FnOnce(&CacheIndex) -> T) -> T {
        let mut state = self.state.lock().await;
        match self.ready(&mut state).await {
            Ok(index) => f(index),
            Err(e) => {
                warn!(error = %e, "Cache unavailable");
                fallback
            }
        }
    }

    fn compute_stats(&self, index: Option<&CacheIndex>) -> CacheStats {
        let mut tiers = TierStatsSet::default();
        for tier in CacheTier::all() {
            tiers.tier_mut(*tier).max = self.config.tier(*tier).max_size;
        }

        let mut total_used = 0u64;
        let mut file_count = 0usize;
        for entry in index.into_iter().flat_map(|i| i.entries()) {
            let stats = tiers.tier_mut(entry.tier);
            stats.used += entry.size;
            stats.count += 1;
            total_used += entry.size;
            file_count += 1;
        }

        CacheStats {
            total_used,
            quota: self.config.quota_bytes,
            tiers,
            file_count,
            counters: self.metrics.snapshot(),
        }
    }

    // =========================================================================
    // Internal Operations
    // =========================================================================

    async fn store_inner(
        &self,
        index: &mut CacheIndex,
        path: &str,
        data: FileData,
        options: StoreOptions,
    ) -> Result<CacheEntry> {
        let content_type = options
            .content_type
            .unwrap_or_else(|| data.implied_content_type().to_string());
        let bytes = data.into_bytes();
        let size = bytes.len() as u64;
        let priority = options.priority.unwrap_or(DEFAULT_PRIORITY);
        let tier = options.tier.unwrap_or_else(|| {
            determine_tier(&FileInfo {
                size,
                content_type: &content_type,
                priority,
            })
        });

        let pinned = [path.to_string()];
        self.ensure_capacity(index, tier, size, Some(path), &pinned)
            .await?;

        let entry = CacheEntry::new(path, size, content_type, tier, priority, options.metadata);
        self.blobs.write(tier.as_str(), &entry.name, bytes).await?;

        if let Some(previous) = index.upsert(entry.clone()) {
            if previous.tier != entry.tier || previous.name != entry.name {
                if let Err(e) = self.blobs.delete(previous.tier.as_str(), &previous.name).await {
                    warn!(path = %path, tier = %previous.tier, error = %e, "Left orphaned blob after overwrite");
                }
            }
        }
        self.persist(index).await?;

        self.metrics.tier(tier).record_store();
        self.emit_event(CacheEvent::stored(path, tier, size));
        debug!(path = %path, tier = %tier, size = size, "Stored cache entry");

        Ok(entry)
    }

    async fn get_inner(&self, index: &mut CacheIndex, path: &str) -> Result<Option<Bytes>> {
        let entry = match index.get(path) {
            Some(entry) => entry.clone(),
            None => {
                self.metrics.record_miss();
                self.emit_event(CacheEvent::miss(path));
                return Ok(None);
            }
        };

        let bytes = self.blobs.read(entry.tier.as_str(), &entry.name).await?;

        let access_count = match index.get_mut(path) {
            Some(e) => {
                e.record_access();
                e.access_count
            }
            None => return Err(Error::EntryNotFound { path: path.to_string() }),
        };
        self.persist(index).await?;

        self.metrics.tier(entry.tier).record_hit();
        self.emit_event(CacheEvent::hit(path, entry.tier, access_count));

        // Runs after the increment so the threshold counts this read
        if let Err(e) = self.maybe_promote_tier(index, path).await {
            warn!(path = %path, error = %e, "Promotion failed");
        }

        Ok(Some(bytes))
    }

    async fn delete_inner(&self, index: &mut CacheIndex, path: &str) -> Result<bool> {
        let entry = match index.get(path) {
            Some(entry) => entry.clone(),
            None => return Ok(false),
        };

        if !self.blobs.delete(entry.tier.as_str(), &entry.name).await? {
            warn!(path = %path, tier = %entry.tier, "Blob already missing, dropping index entry");
        }
        index.remove(path);
        self.persist(index).await?;

        self.emit_event(CacheEvent::Deleted {
            path: path.to_string(),
            tier: entry.tier,
        });
        debug!(path = %path, tier = %entry.tier, "Deleted cache entry");
        Ok(true)
    }

    /// Make room for `incoming` bytes in `tier`.
    ///
    /// `replacing` names an entry whose bytes the incoming data replaces;
    /// its size is not counted against the budget. Entries in `pinned` are
    /// never evicted.
    async fn ensure_capacity(
        &self,
        index: &mut CacheIndex,
        tier: CacheTier,
        incoming: u64,
        replacing: Option<&str>,
        pinned: &[String],
    ) -> Result<()> {
        let tier_config = self.config.tier(tier);
        let replaced = |index: &CacheIndex| -> (u64, u64) {
            replacing
                .and_then(|p| index.get(p))
                .map(|e| (if e.tier == tier { e.size } else { 0 }, e.size))
                .unwrap_or((0, 0))
        };

        let (in_tier, _) = replaced(index);
        let usage = index.tier_usage(tier).saturating_sub(in_tier);
        if tier_config.would_overflow(usage, incoming) {
            let freed = self.evict_old_files(index, tier, incoming, pinned).await?;
            debug!(tier = %tier, needed = incoming, freed = freed, "Evicted entries from cache tier");
        }

        let (in_tier, in_total) = replaced(index);
        let usage = index.tier_usage(tier).saturating_sub(in_tier);
        if tier_config.would_overflow(usage, incoming) {
            self.over_budget(tier, usage, incoming, tier_config.max_size)?;
        }

        let total = index.total_usage().saturating_sub(in_total);
        if total.saturating_add(incoming) > self.config.quota_bytes {
            match self.config.quota_mode {
                QuotaMode::Strict => {
                    return Err(Error::QuotaExceeded {
                        tier: "all".into(),
                        requested: incoming,
                        available: self.config.quota_bytes.saturating_sub(total),
                    })
                }
                QuotaMode::Soft => {
                    warn!(used = total, incoming = incoming, quota = self.config.quota_bytes, "Cache over overall quota");
                }
            }
        }

        Ok(())
    }

    fn over_budget(&self, tier: CacheTier, used: u64, incoming: u64, max: u64) -> Result<()> {
        self.emit_event(CacheEvent::OverBudget {
            tier,
            used_bytes: used.saturating_add(incoming),
            max_bytes: max,
        });
        match self.config.quota_mode {
            QuotaMode::Strict => Err(Error::QuotaExceeded {
                tier: tier.to_string(),
                requested: incoming,
                available: max.saturating_sub(used),
            }),
            QuotaMode::Soft => {
                warn!(tier = %tier, used = used, incoming = incoming, max = max, "Tier stays over budget after eviction");
                Ok(())
            }
        }
    }

    /// Free at least `needed` bytes in `tier` by demoting least recently
    /// used entries first. Best effort: stops early when candidates run out.
    fn evict_old_files<'a>(
        &'a self,
        index: &'a mut CacheIndex,
        tier: CacheTier,
        needed: u64,
        pinned: &'a [String],
    ) -> BoxFuture<'a, Result<u64>> {
        async move {
            let mut freed = 0u64;
            for path in index.lru_order(tier) {
                if freed >= needed {
                    break;
                }
                if pinned.contains(&path) {
                    continue;
                }
                match self.demote_tier(index, &path, pinned).await {
                    Ok(bytes) => freed += bytes,
                    Err(e) => warn!(path = %path, tier = %tier, error = %e, "Eviction candidate failed"),
                }
            }
            Ok(freed)
        }
        .boxed()
    }

    /// Move an entry one tier colder; in the cold tier delete it if it is
    /// past max age. Returns the bytes freed in its current tier.
    async fn demote_tier(&self, index: &mut CacheIndex, path: &str, pinned: &[String]) -> Result<u64> {
        let entry = index
            .get(path)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound { path: path.to_string() })?;

        match entry.tier.demotion_target() {
            Some(target) => {
                if self.move_tier(index, path, target, pinned).await? {
                    Ok(entry.size)
                } else {
                    Ok(0)
                }
            }
            None => {
                let max_age = self.config.tier(entry.tier).max_age;
                if entry.is_older_than(max_age, Utc::now()) {
                    self.remove_entry(index, &entry, EvictionReason::Capacity).await?;
                    Ok(entry.size)
                } else {
                    Ok(0)
                }
            }
        }
    }

    /// Move an entry one tier hotter once it has been read often enough
    async fn maybe_promote_tier(&self, index: &mut CacheIndex, path: &str) -> Result<bool> {
        let (target, access_count) = match index.get(path) {
            Some(entry) => match entry.tier.promotion_target() {
                Some(target) => (target, entry.access_count),
                None => return Ok(false),
            },
            None => return Ok(false),
        };

        if access_count <= self.config.promotion_threshold {
            return Ok(false);
        }
        self.move_tier(index, path, target, &[]).await
    }

    /// Move an entry's bytes into `target`, copy first and delete the source
    /// only after the index points at the copy. Access bookkeeping is left
    /// untouched.
    async fn move_tier(
        &self,
        index: &mut CacheIndex,
        path: &str,
        target: CacheTier,
        pinned: &[String],
    ) -> Result<bool> {
        let size = match index.get(path) {
            Some(entry) if entry.tier == target => return Ok(true),
            Some(entry) => entry.size,
            None => return Ok(false),
        };

        let mut pins = pinned.to_vec();
        pins.push(path.to_string());
        if let Err(e) = self.ensure_capacity(index, target, size, Some(path), &pins).await {
            warn!(path = %path, target = %target, error = %e, "No room to move cache entry");
            return Ok(false);
        }

        // Cascading eviction may have touched the entry
        let entry = match index.get(path) {
            Some(entry) => entry.clone(),
            None => return Ok(false),
        };
        if entry.tier == target {
            return Ok(true);
        }
        let source = entry.tier;

        self.blobs
            .copy(source.as_str(), target.as_str(), &entry.name)
            .await?;

        if let Some(e) = index.get_mut(path) {
            e.tier = target;
        }
        self.persist(index).await?;

        match self.blobs.delete(source.as_str(), &entry.name).await {
            Ok(_) => {}
            Err(e) => warn!(path = %path, tier = %source, error = %e, "Left orphaned blob after move"),
        }

        let counters = self.metrics.tier(source);
        if target < source {
            counters.record_promotion();
        } else {
            counters.record_demotion();
        }
        self.emit_event(CacheEvent::moved(path, source, target, entry.size));
        debug!(path = %path, from = %source, to = %target, "Moved cache entry");

        Ok(true)
    }

    /// Delete an entry on the cache's own initiative
    async fn remove_entry(
        &self,
        index: &mut CacheIndex,
        entry: &CacheEntry,
        reason: EvictionReason,
    ) -> Result<()> {
        if !self.blobs.delete(entry.tier.as_str(), &entry.name).await? {
            warn!(path = %entry.path, tier = %entry.tier, "Blob already missing on eviction");
        }
        index.remove(&entry.path);
        self.persist(index).await?;

        self.metrics.tier(entry.tier).record_eviction();
        self.emit_event(CacheEvent::evicted(&entry.path, entry.tier, entry.size, reason));
        debug!(path = %entry.path, tier = %entry.tier, reason = %reason, "Evicted cache entry");
        Ok(())
    }

    async fn sweep_inner(&self, index: &mut CacheIndex) -> Result<SweepReport> {
        let now = Utc::now();
        let mut report = SweepReport::default();

        // Coldest first so entries demoted in this pass are not revisited
        for tier in CacheTier::all().iter().rev() {
            let max_age = self.config.tier(*tier).max_age;
            let expired: Vec<CacheEntry> = index
                .entries_in(*tier)
                .filter(|e| e.is_older_than(max_age, now))
                .cloned()
                .collect();

            for entry in expired {
                let outcome = match tier.demotion_target() {
                    Some(target) => self.move_tier(index, &entry.path, target, &[]).await,
                    None => self
                        .remove_entry(index, &entry, EvictionReason::Expired)
                        .await
                        .map(|_| true),
                };
                match outcome {
                    Ok(true) if tier.demotion_target().is_some() => report.demoted += 1,
                    Ok(true) => report.deleted += 1,
                    Ok(false) => report.failed += 1,
                    Err(e) => {
                        warn!(path = %entry.path, tier = %tier, error = %e, "Expired entry not handled");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            demoted = report.demoted,
            deleted = report.deleted,
            failed = report.failed,
            "Age sweep complete"
        );
        Ok(report)
    }

    async fn clear_tier_inner(&self, index: &mut CacheIndex, tier: CacheTier) -> Result<bool> {
        let entries: Vec<CacheEntry> = index.entries_in(tier).cloned().collect();
        let mut removed = 0u64;
        let mut bytes = 0u64;

        for entry in &entries {
            self.remove_entry(index, entry, EvictionReason::Cleared).await?;
            removed += 1;
            bytes += entry.size;
        }

        self.emit_event(CacheEvent::TierCleared {
            tier,
            entries_removed: removed,
            bytes_freed: bytes,
        });
        info!(tier = %tier, entries = removed, bytes = bytes, "Cleared cache tier");
        Ok(true)
    }
}

#[async_trait]
impl FileCache for TieredFileCache {
    fn is_supported(&self) -> bool {
        TieredFileCache::is_supported(self)
    }

    async fn store_file(&self, path: &str, data: FileData, options: StoreOptions) -> Option<CacheEntry> {
        TieredFileCache::store_file(self, path, data, options).await
    }

    async fn get_file(&self, path: &str) -> Option<Bytes> {
        TieredFileCache::get_file(self, path).await
    }

    async fn delete_file(&self, path: &str) -> bool {
        TieredFileCache::delete_file(self, path).await
    }

    async fn list_files(&self, tier: Option<CacheTier>) -> Vec<CacheEntry> {
        TieredFileCache::list_files(self, tier).await
    }

    async fn get_stats(&self) -> CacheStats {
        TieredFileCache::get_stats(self).await
    }
}
