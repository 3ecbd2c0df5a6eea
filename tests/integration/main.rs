//! Integration tests for the archiver
//!
//! These tests use wiremock to serve small sites and run full discovery and
//! archive cycles against an in-memory blob store.

mod archive_tests;
mod discovery_tests;

use chrono::NaiveDate;
use site_archiver::archiver::{Archiver, ArchiverOptions};
use site_archiver::storage::SqliteBlobStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Public base URL used by every test archiver
pub const STATIC_URL: &str = "https://static.example.com";

/// Archive domain of a wiremock server (its host, ports are not part of it)
pub const MOCK_DOMAIN: &str = "127.0.0.1";

/// Creates an archiver over a fresh in-memory store
pub fn test_archiver(options: ArchiverOptions) -> Archiver<SqliteBlobStore> {
    Archiver::new(
        reqwest::Client::new(),
        SqliteBlobStore::new_in_memory().expect("Failed to open in-memory store"),
        STATIC_URL,
        options,
    )
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("Invalid test date")
}

/// Serves `body` at `route` with the given content type
pub async fn mount(server: &MockServer, route: &str, content_type: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Serves an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: &str) {
    mount(server, route, "text/html", body).await;
}

/// Serves an HTML page at `route`, expecting exactly `times` requests
pub async fn mount_page_expecting(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .expect(times)
        .mount(server)
        .await;
}
