//! Cache Configuration
//!
//! Overall quota plus one capacity policy per tier. Loadable from YAML.

use crate::cache::tier::{CacheTier, TierConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default soft ceiling across all tiers: 500 MiB
pub const DEFAULT_QUOTA_BYTES: u64 = 500 * 1024 * 1024;

/// Reads an entry must exceed before it is promoted one tier
pub const DEFAULT_PROMOTION_THRESHOLD: u64 = 5;

/// How the cache reacts when eviction cannot free enough room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaMode {
    /// Best-effort eviction; the store proceeds even if still over budget
    #[default]
    Soft,
    /// The store fails if the tier or overall quota would still be exceeded
    Strict,
}

/// Configuration for the tiered file cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Soft ceiling across all tiers
    pub quota_bytes: u64,
    /// Hot tier policy
    pub hot: TierConfig,
    /// Warm tier policy
    pub warm: TierConfig,
    /// Cold tier policy
    pub cold: TierConfig,
    /// Behavior when eviction falls short
    pub quota_mode: QuotaMode,
    /// Promote once `access_count` exceeds this value
    pub promotion_threshold: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
            hot: TierConfig::hot_default(),
            warm: TierConfig::warm_default(),
            cold: TierConfig::cold_default(),
            quota_mode: QuotaMode::Soft,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
        }
    }
}

impl CacheConfig {
    /// Get the policy for a tier
    pub fn tier(&self, tier: CacheTier) -> &TierConfig {
        match tier {
            CacheTier::Hot => &self.hot,
            CacheTier::Warm => &self.warm,
            CacheTier::Cold => &self.cold,
        }
    }

    /// Get a mutable policy for a tier
    pub fn tier_mut(&mut self, tier: CacheTier) -> &mut TierConfig {
        match tier {
            CacheTier::Hot => &mut self.hot,
            CacheTier::Warm => &mut self.warm,
            CacheTier::Cold => &mut self.cold,
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: CacheConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject configurations the cache cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.quota_bytes == 0 {
            return Err(Error::Configuration("quota_bytes must be non-zero".into()));
        }
        for tier in CacheTier::all() {
            if self.tier(*tier).max_size == 0 {
                return Err(Error::Configuration(format!(
                    "{} tier max_size must be non-zero",
                    tier
                )));
            }
        }
        Ok(())
    }

    /// Sum of all tier budgets
    pub fn tier_budget_total(&self) -> u64 {
        CacheTier::all()
            .iter()
            .map(|t| self.tier(*t).max_size)
            .fold(0u64, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.quota_bytes, 500 * 1024 * 1024);
        assert_eq!(config.hot.max_size, 50 * 1024 * 1024);
        assert_eq!(config.hot.max_age, Duration::from_secs(24 * 3600));
        assert_eq!(config.warm.max_size, 150 * 1024 * 1024);
        assert_eq!(config.warm.max_age, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.cold.max_size, 300 * 1024 * 1024);
        assert_eq!(config.cold.max_age, Duration::from_secs(30 * 24 * 3600));
        assert_eq!(config.tier_budget_total(), config.quota_bytes);
        assert_eq!(config.quota_mode, QuotaMode::Soft);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
quota_bytes: 1000
quota_mode: strict
hot:
  max_size: 10
  max_age_secs: 60
  priority: 3
"#;
        let config = CacheConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.quota_bytes, 1000);
        assert_eq!(config.quota_mode, QuotaMode::Strict);
        assert_eq!(config.hot.max_size, 10);
        assert_eq!(config.hot.max_age, Duration::from_secs(60));
        // Unspecified tiers keep defaults
        assert_eq!(config.cold, TierConfig::cold_default());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut config = CacheConfig::default();
        config.warm.max_size = 0;
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        let config = CacheConfig {
            quota_bytes: 0,
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(Error::Configuration(_)));
    }

    #[test]
    fn test_yaml_file_missing() {
        let result = CacheConfig::from_yaml_file("/nonexistent/cache.yaml");
        assert_matches!(result, Err(Error::Configuration(_)));
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cache.yaml");
        let mut config = CacheConfig::default();
        config.tier_mut(CacheTier::Cold).max_age = Duration::from_secs(5);
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = CacheConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
