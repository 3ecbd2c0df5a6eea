//! URL handling module
//!
//! This module provides reference resolution, storage path sanitization,
//! archive domain derivation, and the archive key/URL layout.

mod domain;
mod layout;
mod path;
mod resolve;

// Re-export main functions
pub use domain::{archive_domain, same_host};
pub use layout::{object_key, ArchiveContext};
pub use path::{extension, page_path, sanitize_path};
pub use resolve::{is_special_reference, parse_absolute, resolve_url};
