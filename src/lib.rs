//! Site Archiver: a same-origin website mirroring tool
//!
//! This crate crawls a seed page and its same-site pages, rewrites every embedded
//! reference so the capture is self-contained under an archive root, and stores the
//! result in a blob store under `{domain}/{date}/...` keys.

pub mod archiver;
pub mod config;
pub mod crawler;
pub mod rewriter;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to archive {url}: {source}")]
    Discovery {
        url: String,
        source: Box<ArchiveError>,
    },

    #[error("No assets discovered for {url}")]
    EmptyArchive { url: String },

    #[error("Entry page {url} could not be archived: {reason}")]
    EntryPageFailed { url: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use archiver::{ArchiveReport, Archiver};
pub use config::Config;
pub use crawler::{Asset, AssetType, Crawler};
pub use rewriter::ContentRewriter;
pub use storage::{BlobStore, SqliteBlobStore};
pub use crate::url::{resolve_url, sanitize_path, ArchiveContext};
