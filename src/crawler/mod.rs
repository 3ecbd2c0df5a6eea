//! Crawler module for same-site asset discovery
//!
//! This module contains the discovery side of archiving, including:
//! - The asset model and extension-based type detection
//! - HTTP fetching with error classification
//! - HTML reference extraction
//! - Depth-bounded, same-origin traversal

mod asset;
mod discovery;
mod fetcher;
mod parser;

pub use asset::{content_type_for_path, Asset, AssetType};
pub use discovery::{Crawler, DEFAULT_MAX_DEPTH};
pub use fetcher::{build_http_client, decode_text, fetch_bytes, fetch_text, fetch_url, FetchResult};
pub use parser::{extract_references, PageReferences};
