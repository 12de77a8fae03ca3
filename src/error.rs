//! Error types for the Tiered File Cache
//!
//! Internal operations propagate these errors with `?`. The public cache
//! surface never returns them: it logs and degrades to `None`/`false`.

use thiserror::Error;

/// Unified error type for the cache
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    #[error("Storage primitive not supported: {0}")]
    Unsupported(String),

    #[error("Cache is not initialized")]
    NotInitialized,

    #[error("Cache is closed")]
    Closed,

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Blob not found: {namespace}/{name}")]
    BlobNotFound { namespace: String, name: String },

    #[error("Blob store unavailable: {0}")]
    BlobStoreUnavailable(String),

    #[error("Index store error: {0}")]
    IndexStore(String),

    #[error("Entry not indexed: {path}")]
    EntryNotFound { path: String },

    // =========================================================================
    // Capacity Errors
    // =========================================================================
    #[error("Quota exceeded in tier {tier}: requested {requested} bytes, available {available} bytes")]
    QuotaExceeded {
        tier: String,
        requested: u64,
        available: u64,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is transient (the same call may succeed later)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::BlobStoreUnavailable(_)
                | Error::IndexStore(_)
                | Error::NotInitialized
        )
    }

    /// Check if this error is a logical miss rather than a storage failure
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            Error::BlobNotFound { .. } | Error::EntryNotFound { .. }
        )
    }
}

/// Result type alias for the cache
pub type Result<T> = std::result::Result<T, Error>;
