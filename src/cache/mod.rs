//! Tiered File Cache
//!
//! A bounded, persistent three-tier file cache for offline clients:
//! - **Hot**: small or high-priority files, read often
//! - **Warm**: mid-sized files and entries demoted from hot
//! - **Cold**: large files and entries demoted from warm; deleted once
//!   past their max age when space is needed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          TieredFileCache                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────────┐   │
//! │  │     Hot      │  │     Warm     │  │            Cold              │   │
//! │  │  50 MiB/24h  │  │  150 MiB/7d  │  │        300 MiB/30d           │   │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────┬───────────────┘   │
//! │         │   demote ──▶    │    demote ──▶           │   delete          │
//! │         │   ◀── promote   │    ◀── promote          │                   │
//! │         └─────────────────┼─────────────────────────┘                   │
//! │                   ┌───────┴────────┐        ┌────────────────┐          │
//! │                   │   BlobStore    │        │   IndexStore   │          │
//! │                   │ (one ns/tier)  │        │ (JSON index)   │          │
//! │                   └────────────────┘        └────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tiered_file_cache::cache::{CacheConfig, StoreOptions, TieredFileCache};
//!
//! let cache = TieredFileCache::local("/var/cache/app", CacheConfig::default());
//! cache.init().await;
//!
//! cache.store_file("reports/q3.pdf", pdf_bytes, StoreOptions::new()).await;
//! if let Some(bytes) = cache.get_file("reports/q3.pdf").await {
//!     println!("{} bytes", bytes.len());
//! }
//!
//! let stats = cache.get_stats().await;
//! println!("{} / {} bytes", stats.total_used, stats.quota);
//! ```

pub mod config;
pub mod entry;
pub mod events;
pub mod index;
pub mod manager;
pub mod metrics;
pub mod storage;
pub mod tier;

// Re-export main types
pub use config::{CacheConfig, QuotaMode, DEFAULT_PROMOTION_THRESHOLD, DEFAULT_QUOTA_BYTES};
pub use entry::{
    determine_tier, physical_name, sanitize_name, CacheEntry, FileData, FileInfo, Metadata,
    StoreOptions,
};
pub use events::{CacheEvent, EvictionReason};
pub use index::{CacheIndex, FileIndexStore, IndexStore, MemoryIndexStore, INDEX_KEY};
pub use manager::{CacheStats, SweepReport, TierStats, TierStatsSet, TieredFileCache};
pub use metrics::{CacheMetrics, MetricsSnapshot, TierCounters, TierCountersSnapshot};
pub use storage::{BlobStore, LocalBlobStore, LocalBlobStoreConfig, MemoryBlobStore};
pub use tier::{CacheTier, TierConfig, HOT_SIZE_THRESHOLD_BYTES, WARM_SIZE_THRESHOLD_BYTES};

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

// =============================================================================
// FileCache Trait (Port)
// =============================================================================

/// Core file cache operations
///
/// Consumers such as sync managers and document viewers depend on this
/// port rather than on a concrete cache. Like the concrete cache, it never
/// returns errors: failures degrade to `None`, `false` or empty results.
#[async_trait]
pub trait FileCache: Send + Sync {
    /// Whether the host supports the cache's storage primitive
    fn is_supported(&self) -> bool;

    /// Store data under a logical path, replacing any previous entry
    async fn store_file(&self, path: &str, data: FileData, options: StoreOptions) -> Option<CacheEntry>;

    /// Read the data stored under a logical path
    ///
    /// Counts as an access and may promote the entry one tier.
    async fn get_file(&self, path: &str) -> Option<Bytes>;

    /// Delete the entry for a logical path
    async fn delete_file(&self, path: &str) -> bool;

    /// List entries, optionally restricted to one tier
    async fn list_files(&self, tier: Option<CacheTier>) -> Vec<CacheEntry>;

    /// Usage and activity statistics
    async fn get_stats(&self) -> CacheStats;
}

/// Type alias for Arc'd FileCache
pub type FileCacheRef = Arc<dyn FileCache>;
