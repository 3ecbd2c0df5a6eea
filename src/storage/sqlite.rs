//! SQLite blob store implementation
//!
//! This module provides a SQLite-based implementation of the BlobStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    BlobStore, ListOptions, ListResult, ObjectSummary, PutOptions, StorageError, StorageResult,
    StoredObject,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// SQLite blob store backend
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Creates a new SqliteBlobStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteBlobStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_metadata(&self, key: &str) -> StorageResult<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM object_metadata WHERE object_key = ?1")?;

        let rows = stmt.query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut metadata = BTreeMap::new();
        for row in rows {
            let (name, value): (String, String) = row?;
            metadata.insert(name, value);
        }
        Ok(metadata)
    }
}

impl BlobStore for SqliteBlobStore {
    fn put(&mut self, key: &str, body: &[u8], options: &PutOptions) -> StorageResult<()> {
        let etag = hex::encode(Sha256::digest(body));
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO objects (key, body, content_type, etag, size, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                content_type = excluded.content_type,
                etag = excluded.etag,
                size = excluded.size,
                uploaded_at = excluded.uploaded_at",
            params![key, body, options.content_type, etag, body.len() as i64, now],
        )?;

        tx.execute(
            "DELETE FROM object_metadata WHERE object_key = ?1",
            params![key],
        )?;
        for (name, value) in &options.custom_metadata {
            tx.execute(
                "INSERT INTO object_metadata (object_key, name, value) VALUES (?1, ?2, ?3)",
                params![key, name, value],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<StoredObject>> {
        let row = self
            .conn
            .query_row(
                "SELECT body, content_type, etag, size, uploaded_at FROM objects WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((body, content_type, etag, size, uploaded_at)) = row else {
            return Ok(None);
        };

        let uploaded_at = DateTime::parse_from_rfc3339(&uploaded_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: format!("invalid upload timestamp: {}", e),
            })?;

        Ok(Some(StoredObject {
            key: key.to_string(),
            body,
            content_type,
            etag,
            size: size.max(0) as u64,
            uploaded_at,
            custom_metadata: self.load_metadata(key)?,
        }))
    }

    fn list(&self, options: &ListOptions) -> StorageResult<ListResult> {
        let prefix = options.prefix.as_deref().unwrap_or("");
        let delimiter = options.delimiter.as_deref().filter(|d| !d.is_empty());

        let mut stmt = self.conn.prepare(
            "SELECT key, size FROM objects
             WHERE substr(key, 1, length(?1)) = ?1
             ORDER BY key",
        )?;
        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut objects = Vec::new();
        let mut delimited_prefixes = BTreeSet::new();

        for row in rows {
            let (key, size) = row?;
            let remainder = key.get(prefix.len()..).unwrap_or("");

            match delimiter.and_then(|d| remainder.find(d).map(|idx| idx + d.len())) {
                Some(end) => {
                    delimited_prefixes.insert(format!("{}{}", prefix, &remainder[..end]));
                }
                None => objects.push(ObjectSummary {
                    key,
                    size: size.max(0) as u64,
                }),
            }
        }

        Ok(ListResult {
            objects,
            delimited_prefixes: delimited_prefixes.into_iter().collect(),
        })
    }
}
