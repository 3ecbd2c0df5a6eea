//! HTTP front door
//!
//! A small JSON API over the archiver:
//! - `GET /` - number of archived domains
//! - `POST /archive` - archive a site (requires the archive key)
//! - `GET /{domain}` - archived dates for a domain
//! - `GET /{domain}/{date}/{*path}` - archived objects

mod routes;

use crate::archiver::Archiver;
use crate::config::Config;
use crate::storage::SqliteBlobStore;
use crate::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub archiver: Arc<Archiver<SqliteBlobStore>>,
    pub archive_key: Option<String>,
}

impl AppState {
    pub fn new(archiver: Archiver<SqliteBlobStore>, archive_key: Option<String>) -> Self {
        Self {
            archiver: Arc::new(archiver),
            archive_key,
        }
    }

    /// Checks a submitted archive key against the configured one
    pub fn is_authorized(&self, submitted: Option<&str>) -> bool {
        match (&self.archive_key, submitted) {
            (Some(expected), Some(submitted)) => expected == submitted,
            _ => false,
        }
    }
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index_handler))
        .route("/archive", post(routes::archive_handler))
        .route("/:domain", get(routes::domain_handler))
        .route("/:domain/:date", get(routes::entry_handler))
        .route("/:domain/:date/*path", get(routes::object_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the archive and serves the front door until the process exits
pub async fn serve(config: &Config) -> Result<()> {
    let archiver = Archiver::from_config(config)?;
    if config.server.archive_key.is_none() {
        tracing::warn!("No archive key configured; POST /archive is disabled");
    }

    let app = build_router(AppState::new(archiver, config.server.archive_key.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
