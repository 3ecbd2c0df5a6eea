//! HTTP route handlers
//!
//! Every handler answers with JSON except the object route, which returns the
//! archived bytes.

use crate::crawler::content_type_for_path;
use crate::server::AppState;
use crate::url::object_key;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Cache policy for archived objects; a date partition never changes
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000";

#[derive(Serialize)]
pub struct DomainCountResponse {
    domains: u64,
}

#[derive(Serialize)]
pub struct DomainArchivesResponse {
    domain: String,
    dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    url: String,
    #[serde(default)]
    archive_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    success: bool,
    message: String,
    url: String,
    preview_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            message: None,
            path: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// `GET /` - number of archived domains
pub async fn index_handler(State(state): State<AppState>) -> Json<DomainCountResponse> {
    Json(DomainCountResponse {
        domains: state.archiver.domain_count(),
    })
}

/// `POST /archive` - archives a site
///
/// Requires the configured archive key. With no key configured, archiving
/// over HTTP is disabled.
pub async fn archive_handler(
    State(state): State<AppState>,
    Json(request): Json<ArchiveRequest>,
) -> Response {
    if !state.is_authorized(request.archive_key.as_deref()) {
        tracing::warn!("Rejected archive request for {}: invalid archive key", request.url);
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Invalid archive key")),
        )
            .into_response();
    }

    match state.archiver.archive(&request.url).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ArchiveResponse {
                success: true,
                message: "Page archived successfully".to_string(),
                url: request.url,
                preview_url: report.preview_url,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to archive {}: {}", request.url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to archive page").with_message(e.to_string())),
            )
                .into_response()
        }
    }
}

/// `GET /{domain}` - archived dates for a domain, newest first
pub async fn domain_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Json<DomainArchivesResponse> {
    let dates = state.archiver.list_archives(&domain);
    Json(DomainArchivesResponse { domain, dates })
}

/// `GET /{domain}/{date}` - the archived entry page
pub async fn entry_handler(
    State(state): State<AppState>,
    Path((domain, date)): Path<(String, String)>,
) -> Response {
    serve_object(&state, &domain, &date, "")
}

/// `GET /{domain}/{date}/{*path}` - one archived object
///
/// The object path is taken from the raw request path so percent-encoded
/// characters match the stored keys exactly.
pub async fn object_handler(
    State(state): State<AppState>,
    Path((domain, date, _)): Path<(String, String, String)>,
    uri: Uri,
) -> Response {
    serve_object(&state, &domain, &date, raw_object_path(uri.path()))
}

fn serve_object(state: &AppState, domain: &str, date: &str, path: &str) -> Response {
    let key = object_key(domain, date, path);

    match state.archiver.fetch_archived(domain, date, path) {
        Ok(Some(object)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type_for_path(&key).to_string()),
                (header::ETAG, format!("\"{}\"", object.etag)),
                (header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string()),
            ],
            object.body,
        )
            .into_response(),
        Ok(None) => {
            tracing::debug!("Archived object not found: {}", key);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Archive not found").with_path(key)),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read archived object {}: {}", key, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to retrieve archive").with_message(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Returns everything after the `/{domain}/{date}/` prefix of a raw request path
fn raw_object_path(uri_path: &str) -> &str {
    uri_path
        .trim_start_matches('/')
        .splitn(3, '/')
        .nth(2)
        .unwrap_or("")
}
