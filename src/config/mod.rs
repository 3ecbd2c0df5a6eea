//! Configuration module for the archiver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Archiver will use max depth: {}", config.archiver.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiverConfig, Config, ServerConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
