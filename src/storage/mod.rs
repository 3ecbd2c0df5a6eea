//! Storage module for persisting archived objects
//!
//! This module handles the blob store the archiver writes to, including:
//! - The `BlobStore` trait (`put`/`get`/`list` with delimiter grouping)
//! - SQLite database initialization and schema management
//! - Object bodies, content types, etags and custom metadata

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteBlobStore;
pub use traits::{
    BlobStore, ListOptions, ListResult, ObjectSummary, PutOptions, StorageError, StorageResult,
    StoredObject,
};

use std::path::Path;

/// Initializes or opens a blob store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteBlobStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_store(path: &Path) -> StorageResult<SqliteBlobStore> {
    SqliteBlobStore::new(path)
}
