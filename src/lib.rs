//! Tiered File Cache
//!
//! A client-side persistent file cache that keeps recently used files
//! available offline within a bounded storage budget. Files live in one of
//! three tiers (hot, warm, cold); entries move colder as space runs out and
//! hotter as they are read.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                    Callers (sync, viewers, CLI)                     │
//! ├───────────────────────────────────────────────────────────────────┤
//! │                  FileCache port / TieredFileCache                   │
//! │      placement · LRU eviction · demotion · promotion · stats       │
//! ├──────────────────────────────┬────────────────────────────────────┤
//! │   BlobStore (hot/warm/cold)  │     IndexStore (JSON index)        │
//! │   LocalBlobStore, Memory     │     FileIndexStore, Memory         │
//! └──────────────────────────────┴────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Cache service, tiers, entries, index and blob stores
//! - [`error`]: Error types and handling

pub mod cache;
pub mod error;

// Re-export commonly used types
pub use cache::{
    BlobStore, CacheConfig, CacheEntry, CacheEvent, CacheStats, CacheTier, FileCache,
    FileCacheRef, FileData, IndexStore, QuotaMode, StoreOptions, SweepReport, TierConfig,
    TieredFileCache,
};

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
