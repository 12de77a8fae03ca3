//! Cache Tier Definitions
//!
//! Defines the hot/warm/cold hierarchy, the placement rules used when a
//! caller does not force a tier, and the per-tier capacity policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Placement Thresholds
// =============================================================================

/// Objects smaller than this are placed in the hot tier: 1 MiB
pub const HOT_SIZE_THRESHOLD_BYTES: u64 = 1024 * 1024;

/// Objects smaller than this are placed in the warm tier: 10 MiB
pub const WARM_SIZE_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Caller priority at or above which an object is placed in the hot tier
pub const HOT_PRIORITY: i32 = 3;

/// Caller priority at or above which an object is placed in the warm tier
pub const WARM_PRIORITY: i32 = 2;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

// =============================================================================
// Cache Tier
// =============================================================================

/// Cache tier representing the retention hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    /// Frequently accessed or small objects
    #[default]
    Hot,
    /// Medium-sized or moderately important objects
    Warm,
    /// Large or rarely accessed objects, last stop before deletion
    Cold,
}

impl CacheTier {
    /// Decide placement for an object that has no explicit tier.
    ///
    /// The hot check runs first, so a small low-priority object still
    /// lands in hot.
    pub fn classify(size_bytes: u64, priority: i32) -> Self {
        if priority >= HOT_PRIORITY || size_bytes < HOT_SIZE_THRESHOLD_BYTES {
            CacheTier::Hot
        } else if priority >= WARM_PRIORITY || size_bytes < WARM_SIZE_THRESHOLD_BYTES {
            CacheTier::Warm
        } else {
            CacheTier::Cold
        }
    }

    /// Get the demotion target tier (None means the entry is deleted instead)
    pub fn demotion_target(&self) -> Option<CacheTier> {
        match self {
            CacheTier::Hot => Some(CacheTier::Warm),
            CacheTier::Warm => Some(CacheTier::Cold),
            CacheTier::Cold => None,
        }
    }

    /// Get the promotion target tier
    pub fn promotion_target(&self) -> Option<CacheTier> {
        match self {
            CacheTier::Hot => None,
            CacheTier::Warm => Some(CacheTier::Hot),
            CacheTier::Cold => Some(CacheTier::Warm),
        }
    }

    /// Name of the blob-store sub-namespace holding this tier's bytes
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Hot => "hot",
            CacheTier::Warm => "warm",
            CacheTier::Cold => "cold",
        }
    }

    /// All tiers, hottest first
    pub fn all() -> &'static [CacheTier] {
        &[CacheTier::Hot, CacheTier::Warm, CacheTier::Cold]
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheTier {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hot" => Ok(CacheTier::Hot),
            "warm" => Ok(CacheTier::Warm),
            "cold" => Ok(CacheTier::Cold),
            other => Err(crate::error::Error::Configuration(format!(
                "unknown tier '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// Tier Configuration
// =============================================================================

/// Static capacity policy for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Byte budget for the tier
    pub max_size: u64,
    /// Time since last access after which an entry is demoted (cold: deleted)
    #[serde(rename = "max_age_secs", with = "duration_secs")]
    pub max_age: Duration,
    /// Relative importance, informational only
    pub priority: u8,
}

impl TierConfig {
    /// Default policy for the hot tier: 50 MiB, 24 hours
    pub fn hot_default() -> Self {
        Self {
            max_size: 50 * 1024 * 1024,
            max_age: Duration::from_secs(DAY),
            priority: 3,
        }
    }

    /// Default policy for the warm tier: 150 MiB, 7 days
    pub fn warm_default() -> Self {
        Self {
            max_size: 150 * 1024 * 1024,
            max_age: Duration::from_secs(7 * DAY),
            priority: 2,
        }
    }

    /// Default policy for the cold tier: 300 MiB, 30 days
    pub fn cold_default() -> Self {
        Self {
            max_size: 300 * 1024 * 1024,
            max_age: Duration::from_secs(30 * DAY),
            priority: 1,
        }
    }

    /// Check whether adding `incoming` bytes to `current` would overflow
    pub fn would_overflow(&self, current: u64, incoming: u64) -> bool {
        current.saturating_add(incoming) > self.max_size
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
