//! Cache Events
//!
//! Events broadcast by the cache for monitoring and for consumers such as
//! offline-sync managers that mirror cache contents.

use crate::cache::tier::CacheTier;
use serde::{Deserialize, Serialize};

/// Events emitted by the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheEvent {
    /// Entry was stored (created or overwritten)
    Stored {
        path: String,
        tier: CacheTier,
        size_bytes: u64,
    },

    /// Entry was read
    Hit {
        path: String,
        tier: CacheTier,
        access_count: u64,
    },

    /// Path not indexed, or its bytes could not be read
    Miss {
        path: String,
    },

    /// Entry was deleted by the caller
    Deleted {
        path: String,
        tier: CacheTier,
    },

    /// Entry was removed by the cache itself
    Evicted {
        path: String,
        tier: CacheTier,
        size_bytes: u64,
        reason: EvictionReason,
    },

    /// Entry was moved to a colder tier
    Demoted {
        path: String,
        from_tier: CacheTier,
        to_tier: CacheTier,
        size_bytes: u64,
    },

    /// Entry was moved to a hotter tier
    Promoted {
        path: String,
        from_tier: CacheTier,
        to_tier: CacheTier,
        size_bytes: u64,
    },

    /// Tier cleared
    TierCleared {
        tier: CacheTier,
        entries_removed: u64,
        bytes_freed: u64,
    },

    /// Eviction could not bring a tier back under budget
    OverBudget {
        tier: CacheTier,
        used_bytes: u64,
        max_bytes: u64,
    },
}

/// Reason for eviction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionReason {
    /// Tier over budget, entry was cold and past its max age
    Capacity,
    /// Age sweep removed an expired cold entry
    Expired,
    /// Tier or cache cleared
    Cleared,
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionReason::Capacity => write!(f, "capacity"),
            EvictionReason::Expired => write!(f, "expired"),
            EvictionReason::Cleared => write!(f, "cleared"),
        }
    }
}

impl CacheEvent {
    pub fn stored(path: &str, tier: CacheTier, size_bytes: u64) -> Self {
        CacheEvent::Stored {
            path: path.to_string(),
            tier,
            size_bytes,
        }
    }

    pub fn hit(path: &str, tier: CacheTier, access_count: u64) -> Self {
        CacheEvent::Hit {
            path: path.to_string(),
            tier,
            access_count,
        }
    }

    pub fn miss(path: &str) -> Self {
        CacheEvent::Miss {
            path: path.to_string(),
        }
    }

    pub fn evicted(path: &str, tier: CacheTier, size_bytes: u64, reason: EvictionReason) -> Self {
        CacheEvent::Evicted {
            path: path.to_string(),
            tier,
            size_bytes,
            reason,
        }
    }

    /// Build a Demoted or Promoted event depending on direction
    pub fn moved(path: &str, from_tier: CacheTier, to_tier: CacheTier, size_bytes: u64) -> Self {
        let path = path.to_string();
        if to_tier < from_tier {
            CacheEvent::Promoted {
                path,
                from_tier,
                to_tier,
                size_bytes,
            }
        } else {
            CacheEvent::Demoted {
                path,
                from_tier,
                to_tier,
                size_bytes,
            }
        }
    }

    /// Get the path associated with this event (if any)
    pub fn path(&self) -> Option<&str> {
        match self {
            CacheEvent::Stored { path, .. }
            | CacheEvent::Hit { path, .. }
            | CacheEvent::Miss { path }
            | CacheEvent::Deleted { path, .. }
            | CacheEvent::Evicted { path, .. }
            | CacheEvent::Demoted { path, .. }
            | CacheEvent::Promoted { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Get the tier associated with this event (destination tier for moves)
    pub fn tier(&self) -> Option<CacheTier> {
        match self {
            CacheEvent::Stored { tier, .. }
            | CacheEvent::Hit { tier, .. }
            | CacheEvent::Deleted { tier, .. }
            | CacheEvent::Evicted { tier, .. }
            | CacheEvent::TierCleared { tier, .. }
            | CacheEvent::OverBudget { tier, .. } => Some(*tier),
            CacheEvent::Demoted { to_tier, .. } | CacheEvent::Promoted { to_tier, .. } => {
                Some(*to_tier)
            }
            CacheEvent::Miss { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let hit = CacheEvent::hit("fleet/vessel-7.json", CacheTier::Warm, 3);
        assert_eq!(hit.path(), Some("fleet/vessel-7.json"));
        assert_eq!(hit.tier(), Some(CacheTier::Warm));

        let cleared = CacheEvent::TierCleared {
            tier: CacheTier::Cold,
            entries_removed: 2,
            bytes_freed: 10,
        };
        assert_eq!(cleared.path(), None);
        assert_eq!(cleared.tier(), Some(CacheTier::Cold));
    }

    #[test]
    fn test_moved_direction() {
        let up = CacheEvent::moved("a", CacheTier::Cold, CacheTier::Warm, 1);
        assert!(matches!(up, CacheEvent::Promoted { .. }));
        assert_eq!(up.tier(), Some(CacheTier::Warm));

        let down = CacheEvent::moved("a", CacheTier::Hot, CacheTier::Warm, 1);
        assert!(matches!(down, CacheEvent::Demoted { .. }));
    }

    #[test]
    fn test_eviction_reason_display() {
        assert_eq!(format!("{}", EvictionReason::Capacity), "capacity");
        assert_eq!(format!("{}", EvictionReason::Expired), "expired");
        assert_eq!(format!("{}", EvictionReason::Cleared), "cleared");
    }
}
