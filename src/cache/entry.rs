//! Cache Entry Types
//!
//! Defines indexed entries, caller payloads, store options and the mapping
//! from logical paths to physical blob names.

use crate::cache::tier::CacheTier;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

/// Content type used when the caller does not supply one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type recorded for text payloads without an explicit type
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Priority used when the caller does not supply one
pub const DEFAULT_PRIORITY: i32 = 1;

/// Longest readable prefix kept in a physical name
const NAME_PREFIX_MAX: usize = 64;

/// Opaque caller metadata carried through moves unchanged
pub type Metadata = BTreeMap<String, serde_json::Value>;

// =============================================================================
// Physical Names
// =============================================================================

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_name(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Blob name for a logical path.
///
/// A readable sanitized prefix followed by a digest of the full path, so
/// two paths that sanitize identically still get distinct blobs.
pub fn physical_name(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    let mut prefix = sanitize_name(path);
    if prefix.len() > NAME_PREFIX_MAX {
        // sanitized output is pure ASCII, any byte index is a char boundary
        prefix.truncate(NAME_PREFIX_MAX);
    }
    format!("{}-{}", prefix, hex::encode(&digest[..16]))
}

// =============================================================================
// File Data
// =============================================================================

/// Payload handed to the cache by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    /// Raw bytes
    Binary(Bytes),
    /// Text, UTF-8 encoded before storage
    Text(String),
}

impl FileData {
    /// Normalize to a raw byte buffer
    pub fn into_bytes(self) -> Bytes {
        match self {
            FileData::Binary(bytes) => bytes,
            FileData::Text(text) => Bytes::from(text.into_bytes()),
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> u64 {
        match self {
            FileData::Binary(bytes) => bytes.len() as u64,
            FileData::Text(text) => text.len() as u64,
        }
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type implied by the payload kind
    pub fn implied_content_type(&self) -> &'static str {
        match self {
            FileData::Binary(_) => DEFAULT_CONTENT_TYPE,
            FileData::Text(_) => TEXT_CONTENT_TYPE,
        }
    }
}

impl From<Bytes> for FileData {
    fn from(bytes: Bytes) -> Self {
        FileData::Binary(bytes)
    }
}

impl From<Vec<u8>> for FileData {
    fn from(bytes: Vec<u8>) -> Self {
        FileData::Binary(Bytes::from(bytes))
    }
}

impl From<&[u8]> for FileData {
    fn from(bytes: &[u8]) -> Self {
        FileData::Binary(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for FileData {
    fn from(bytes: &[u8; N]) -> Self {
        FileData::Binary(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for FileData {
    fn from(text: String) -> Self {
        FileData::Text(text)
    }
}

impl From<&str> for FileData {
    fn from(text: &str) -> Self {
        FileData::Text(text.to_string())
    }
}

// =============================================================================
// Store Options
// =============================================================================

/// Caller overrides for a store
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Content type (defaults by payload kind)
    pub content_type: Option<String>,
    /// Forced tier (defaults to classification)
    pub tier: Option<CacheTier>,
    /// Placement priority (defaults to 1)
    pub priority: Option<i32>,
    /// Opaque metadata
    pub metadata: Metadata,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_tier(mut self, tier: CacheTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// =============================================================================
// Tier Classification Input
// =============================================================================

/// Attributes considered when classifying an object
#[derive(Debug, Clone)]
pub struct FileInfo<'a> {
    pub size: u64,
    pub content_type: &'a str,
    pub priority: i32,
}

/// Decide the tier for an object without an explicit tier
pub fn determine_tier(info: &FileInfo<'_>) -> CacheTier {
    CacheTier::classify(info.size, info.priority)
}

// =============================================================================
// Cache Entry
// =============================================================================

/// One indexed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Physical blob name inside the tier namespace
    pub name: String,
    /// Logical path supplied by the caller, unique per entry
    pub path: String,
    /// Payload length in bytes
    pub size: u64,
    /// MIME-like content type
    pub content_type: String,
    /// Tier holding the bytes
    pub tier: CacheTier,
    /// Time of the most recent read or write
    pub last_accessed: DateTime<Utc>,
    /// Reads since creation
    pub access_count: u64,
    /// Caller-supplied placement priority
    pub priority: i32,
    /// Opaque caller metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl CacheEntry {
    /// Create a fresh entry, as written by a store
    pub fn new(
        path: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        tier: CacheTier,
        priority: i32,
        metadata: Metadata,
    ) -> Self {
        let path = path.into();
        Self {
            name: physical_name(&path),
            path,
            size,
            content_type: content_type.into(),
            tier,
            last_accessed: Utc::now(),
            access_count: 0,
            priority,
            metadata,
        }
    }

    /// Record a read
    pub fn record_access(&mut self) {
        self.last_accessed = Utc::now();
        self.access_count += 1;
    }

    /// Time since the last access (zero if the clock went backwards)
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_accessed).to_std().unwrap_or(Duration::ZERO)
    }

    /// Check whether the entry has been idle longer than `max_age`
    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.idle_for(now) > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("a/b.txt"), "a_b.txt");
        assert_eq!(sanitize_name("vessel 7/log#1.json"), "vessel_7_log_1.json");
        assert_eq!(sanitize_name("ok-name.bin"), "ok-name.bin");
        assert_eq!(sanitize_name("ümlaut"), "_mlaut");
    }

    #[test]
    fn test_physical_name_avoids_collisions() {
        // Both sanitize to "a_b"
        assert_eq!(sanitize_name("a/b"), sanitize_name("a?b"));
        assert_ne!(physical_name("a/b"), physical_name("a?b"));

        assert_eq!(physical_name("a/b"), physical_name("a/b"));
        assert!(physical_name("a/b").starts_with("a_b-"));
    }

    #[test]
    fn test_physical_name_truncates_prefix() {
        let long = "x".repeat(500);
        let name = physical_name(&long);
        assert_eq!(name.len(), NAME_PREFIX_MAX + 1 + 32);
    }

    #[test]
    fn test_file_data_normalization() {
        let text: FileData = "hello".into();
        assert_eq!(text.len(), 5);
        assert_eq!(text.implied_content_type(), TEXT_CONTENT_TYPE);
        assert_eq!(text.into_bytes(), Bytes::from_static(b"hello"));

        let raw: FileData = vec![1u8, 2, 3].into();
        assert_eq!(raw.implied_content_type(), DEFAULT_CONTENT_TYPE);
        assert_eq!(raw.into_bytes().as_ref(), &[1, 2, 3]);

        let empty: FileData = Bytes::new().into();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_determine_tier() {
        let info = |size| FileInfo {
            size,
            content_type: "x",
            priority: 1,
        };
        assert_eq!(determine_tier(&info(500_000)), CacheTier::Hot);
        assert_eq!(determine_tier(&info(5_000_000)), CacheTier::Warm);
        assert_eq!(determine_tier(&info(50_000_000)), CacheTier::Cold);
    }

    #[test]
    fn test_entry_access() {
        let mut entry = CacheEntry::new("a/b.txt", 3, "text/plain", CacheTier::Cold, 1, Metadata::new());
        assert_eq!(entry.access_count, 0);
        let before = entry.last_accessed;
        entry.record_access();
        entry.record_access();
        assert_eq!(entry.access_count, 2);
        assert!(entry.last_accessed >= before);
    }

    #[test]
    fn test_entry_age() {
        let mut entry = CacheEntry::new("a", 1, "x", CacheTier::Cold, 1, Metadata::new());
        let now = Utc::now();
        entry.last_accessed = now - chrono::Duration::hours(2);
        assert!(entry.is_older_than(Duration::from_secs(3600), now));
        assert!(!entry.is_older_than(Duration::from_secs(3 * 3600), now));

        // Future timestamps count as zero idle time
        entry.last_accessed = now + chrono::Duration::hours(1);
        assert_eq!(entry.idle_for(now), Duration::ZERO);
    }

    #[test]
    fn test_entry_serde_keeps_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("vessel".into(), serde_json::json!("MV Aurora"));
        let entry = CacheEntry::new("reports/q3.pdf", 42, "application/pdf", CacheTier::Warm, 2, metadata);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"tier\":\"warm\""));
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
