use serde::Deserialize;

/// Main configuration structure for the archiver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub archiver: ArchiverConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Crawl and archive behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiverConfig {
    /// Maximum link depth to follow from the seed page
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of assets fetched and stored at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for a single HTTP request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for fetching, rewriting and storing one asset (seconds)
    #[serde(rename = "asset-timeout-secs", default = "default_asset_timeout")]
    pub asset_timeout_secs: u64,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
            asset_timeout_secs: default_asset_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    ///
    /// The parenthesised contact part only contains the fields that are set.
    pub fn header_value(&self) -> String {
        let contact: Vec<String> = [
            self.contact_url.as_ref().map(|url| format!("+{}", url)),
            self.contact_email.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} ({})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

/// Blob storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding archived objects
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Public base URL archived objects are served from
    #[serde(rename = "static-url")]
    pub static_url: String,
}

/// HTTP front door configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    /// Shared secret required by `POST /archive`
    #[serde(rename = "archive-key", default)]
    pub archive_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            archive_key: None,
        }
    }
}

fn default_max_depth() -> u32 {
    5
}

fn default_concurrency() -> usize {
    8
}

fn default_request_timeout() -> u64 {
    30
}

fn default_asset_timeout() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "SiteArchiver".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_database_path() -> String {
    "./archive.db".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8787".to_string()
}
