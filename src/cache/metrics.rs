//! Cache Metrics
//!
//! Cache-line aligned activity counters. These count operations only;
//! byte usage is always derived from the index and never tracked here.

use crate::cache::tier::CacheTier;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache line size for alignment (64 bytes on most modern CPUs)
pub const CACHE_LINE_SIZE: usize = 64;

// =============================================================================
// Per-Tier Counters (Cache-Line Aligned)
// =============================================================================

/// Counters for a single tier, aligned to prevent false sharing
#[repr(C, align(64))]
#[derive(Debug)]
pub struct TierCounters {
    /// Successful reads served from this tier
    pub hits: AtomicU64,
    /// Stores written into this tier
    pub stores: AtomicU64,
    /// Entries promoted out of this tier
    pub promotions: AtomicU64,
    /// Entries demoted out of this tier
    pub demotions: AtomicU64,
    /// Entries deleted by the cache from this tier
    pub evictions: AtomicU64,
    /// Last update timestamp (Unix millis)
    pub last_update_ms: AtomicU64,
    _padding: [u8; 16],
}

const _: () = assert!(std::mem::size_of::<TierCounters>() <= CACHE_LINE_SIZE);

impl Default for TierCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl TierCounters {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            promotions: AtomicU64::new(0),
            demotions: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            last_update_ms: AtomicU64::new(0),
            _padding: [0; 16],
        }
    }

    #[inline]
    pub fn record_hit(&self) {
        self.bump(&self.hits);
    }

    #[inline]
    pub fn record_store(&self) {
        self.bump(&self.stores);
    }

    #[inline]
    pub fn record_promotion(&self) {
        self.bump(&self.promotions);
    }

    #[inline]
    pub fn record_demotion(&self) {
        self.bump(&self.demotions);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.bump(&self.evictions);
    }

    #[inline]
    fn bump(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
        self.last_update_ms
            .store(Utc::now().timestamp_millis().max(0) as u64, Ordering::Release);
    }

    pub fn snapshot(&self) -> TierCountersSnapshot {
        TierCountersSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            demotions: self.demotions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of one tier's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierCountersSnapshot {
    pub hits: u64,
    pub stores: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub evictions: u64,
}

// =============================================================================
// Global Cache Metrics
// =============================================================================

/// Counters for the whole cache
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hot: TierCounters,
    pub warm: TierCounters,
    pub cold: TierCounters,
    /// Reads of paths that were not indexed or could not be read
    pub misses: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get counters for a specific tier
    pub fn tier(&self, tier: CacheTier) -> &TierCounters {
        match tier {
            CacheTier::Hot => &self.hot,
            CacheTier::Warm => &self.warm,
            CacheTier::Cold => &self.cold,
        }
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hot: self.hot.snapshot(),
            warm: self.warm.snapshot(),
            cold: self.cold.snapshot(),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub hot: TierCountersSnapshot,
    pub warm: TierCountersSnapshot,
    pub cold: TierCountersSnapshot,
    pub misses: u64,
}

impl MetricsSnapshot {
    pub fn tier(&self, tier: CacheTier) -> &TierCountersSnapshot {
        match tier {
            CacheTier::Hot => &self.hot,
            CacheTier::Warm => &self.warm,
            CacheTier::Cold => &self.cold,
        }
    }

    pub fn total_hits(&self) -> u64 {
        self.hot.hits + self.warm.hits + self.cold.hits
    }

    /// Hit ratio over all reads (0.0 when nothing was read)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total_hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total as f64
        }
    }
}
