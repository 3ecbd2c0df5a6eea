//! Asset model for discovered resources
//!
//! An asset is one resource reachable from the seed page. Assets are keyed by
//! their absolute URL and carry the canonical storage path they are archived at.

use crate::url::{extension, sanitize_path};
use serde::Serialize;
use std::fmt;

/// The kind of a discovered resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Html,
    Css,
    Js,
    Image,
    Font,
    Iframe,
    Icon,
    Media,
    Json,
    Xml,
    Pdf,
    Other,
}

impl AssetType {
    /// Returns the lowercase name stored in archive metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Image => "image",
            Self::Font => "font",
            Self::Iframe => "iframe",
            Self::Icon => "icon",
            Self::Media => "media",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Pdf => "pdf",
            Self::Other => "other",
        }
    }

    /// Classifies a path or reference by its file extension
    ///
    /// Unknown or missing extensions classify as `Other`.
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("html" | "htm") => Self::Html,
            Some("css") => Self::Css,
            Some("js" | "mjs") => Self::Js,
            Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "avif") => Self::Image,
            Some("woff" | "woff2" | "ttf" | "otf" | "eot") => Self::Font,
            Some("ico") => Self::Icon,
            Some("mp4" | "mp3" | "webm" | "ogg" | "wav") => Self::Media,
            Some("json") => Self::Json,
            Some("xml") => Self::Xml,
            Some("pdf") => Self::Pdf,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the content type served for an archived path, based on its extension
pub fn content_type_for_path(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("pdf") => "application/pdf",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// One discovered resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Absolute source URL (unique within one crawl)
    pub url: String,

    /// Kind of resource
    pub asset_type: AssetType,

    /// Canonical storage sub-path, always starting with `/` and naming a file
    pub path: String,

    /// True only for iframes on another host; these are never fetched
    pub is_external: bool,

    /// Discovery depth at which the asset was first reached
    pub depth: u32,
}

impl Asset {
    /// Creates an asset, sanitizing the suggested path
    pub fn new(url: impl Into<String>, asset_type: AssetType, path: &str, depth: u32) -> Self {
        Self {
            url: url.into(),
            asset_type,
            path: sanitize_path(path),
            is_external: false,
            depth,
        }
    }

    /// Creates a record for an iframe hosted on another site
    pub fn external_iframe(url: impl Into<String>, path: &str, depth: u32) -> Self {
        Self {
            is_external: true,
            ..Self::new(url, AssetType::Iframe, path, depth)
        }
    }
}
