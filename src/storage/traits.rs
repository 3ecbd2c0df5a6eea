//! Storage traits and error types
//!
//! This module defines the blob store interface the archiver writes to and
//! the front door reads from, plus its associated types.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Options for writing an object
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Content type served with the object
    pub content_type: String,

    /// Free-form string metadata stored alongside the object
    pub custom_metadata: BTreeMap<String, String>,
}

/// An object read back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    /// Hex SHA-256 of the body
    pub etag: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub custom_metadata: BTreeMap<String, String>,
}

/// Key and size of a listed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

/// Options for listing objects
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only keys starting with this prefix are listed
    pub prefix: Option<String>,

    /// Groups keys by the first occurrence of the delimiter after the prefix
    pub delimiter: Option<String>,
}

impl ListOptions {
    /// Lists the direct children of `prefix`, grouped on `/`
    pub fn children_of(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            delimiter: Some("/".to_string()),
        }
    }

    /// Lists the top-level `/` groups of the whole store
    pub fn top_level() -> Self {
        Self {
            prefix: None,
            delimiter: Some("/".to_string()),
        }
    }
}

/// Result of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    /// Keys with no delimiter after the prefix, sorted
    pub objects: Vec<ObjectSummary>,

    /// Distinct `prefix + remainder[..=delimiter]` groups, sorted
    pub delimited_prefixes: Vec<String>,
}

/// Trait for blob store implementations
///
/// Keys are plain strings; the archiver lays them out as
/// `{domain}/{date}/{path}`. Writing an existing key replaces it.
pub trait BlobStore: Send {
    /// Writes an object, replacing any existing object with the same key
    fn put(&mut self, key: &str, body: &[u8], options: &PutOptions) -> StorageResult<()>;

    /// Reads an object, returning `None` if the key does not exist
    fn get(&self, key: &str) -> StorageResult<Option<StoredObject>>;

    /// Lists objects and delimiter groups under a prefix
    fn list(&self, options: &ListOptions) -> StorageResult<ListResult>;
}
