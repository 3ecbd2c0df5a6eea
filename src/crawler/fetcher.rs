//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the archiver, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for pages and assets (redirects are followed)
//! - Error classification

use crate::config::UserAgentConfig;
use crate::{ArchiveError, Result};
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the request hit the client timeout
        timed_out: bool,
    },
}

impl FetchResult {
    /// Converts the result into the response body, mapping every failure to an
    /// [`ArchiveError`] that names the URL
    pub fn into_body(self, url: &str) -> Result<Vec<u8>> {
        match self {
            FetchResult::Success { body, .. } => Ok(body),
            FetchResult::HttpError { status_code } => Err(ArchiveError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP status {}", status_code),
            }),
            FetchResult::NetworkError {
                timed_out: true, ..
            } => Err(ArchiveError::Timeout {
                url: url.to_string(),
            }),
            FetchResult::NetworkError { error, .. } => Err(ArchiveError::Fetch {
                url: url.to_string(),
                reason: error,
            }),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `request_timeout` - Total timeout for a single request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_archiver::config::UserAgentConfig;
/// use site_archiver::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SiteArchiver".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
///     contact_email: Some("admin@example.com".to_string()),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | `Success` with the raw body |
/// | Other status | `HttpError` |
/// | Timeout | `NetworkError` with `timed_out` set |
/// | Connection refused, TLS, body read errors | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => classify_error(e),
    }
}

/// Fetches a URL and returns its raw body
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    fetch_url(client, url).await.into_body(url)
}

/// Fetches a URL and decodes its body as text
///
/// Invalid UTF-8 sequences are replaced rather than failing the fetch.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let body = fetch_bytes(client, url).await?;
    Ok(decode_text(body))
}

/// Decodes a response body as UTF-8, replacing invalid sequences
pub fn decode_text(body: Vec<u8>) -> String {
    match String::from_utf8(body) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}
