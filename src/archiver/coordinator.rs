//! Archive coordinator - main archive orchestration logic
//!
//! This module drives one archive run end to end:
//! - Fixing the archive domain and date for the run
//! - Running discovery from the seed page
//! - Fetching, rewriting and storing every asset through a bounded pool
//! - Collecting per-asset failures into the report
//!
//! It also answers the read-side queries the front door needs.

use crate::archiver::report::{ArchiveReport, AssetFailure};
use crate::config::{ArchiverConfig, Config};
use crate::crawler::{
    build_http_client, content_type_for_path, decode_text, fetch_bytes, Asset, AssetType, Crawler,
    DEFAULT_MAX_DEPTH,
};
use crate::rewriter::ContentRewriter;
use crate::storage::{
    open_store, BlobStore, ListOptions, PutOptions, SqliteBlobStore, StorageError, StorageResult,
    StoredObject,
};
use crate::url::{archive_domain, object_key, parse_absolute, ArchiveContext};
use crate::{ArchiveError, Result, UrlError};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Tuning knobs for one archiver
#[derive(Debug, Clone)]
pub struct ArchiverOptions {
    /// Maximum link depth followed from the seed page
    pub max_depth: u32,

    /// Maximum number of assets processed at the same time
    pub concurrency: usize,

    /// Time limit for fetching, rewriting and storing one asset
    pub asset_timeout: Duration,
}

impl Default for ArchiverOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: 8,
            asset_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ArchiverConfig> for ArchiverOptions {
    fn from(config: &ArchiverConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            concurrency: config.concurrency.max(1),
            asset_timeout: Duration::from_secs(config.asset_timeout_secs),
        }
    }
}

/// Main archiver structure
///
/// The blob store is shared behind a mutex that is only held for the length
/// of a single synchronous store call, never across an await point.
pub struct Archiver<S: BlobStore> {
    client: Client,
    store: Arc<Mutex<S>>,
    static_url: String,
    options: ArchiverOptions,
}

impl Archiver<SqliteBlobStore> {
    /// Creates an archiver from a loaded configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The archiver configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Archiver)` - HTTP client built and blob store opened
    /// * `Err(ArchiveError)` - Failed to build the client or open the database
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.archiver.request_timeout_secs),
        )?;
        let store = open_store(Path::new(&config.storage.database_path))?;

        tracing::info!("Opened archive database {}", config.storage.database_path);

        Ok(Self::new(
            client,
            store,
            &config.storage.static_url,
            ArchiverOptions::from(&config.archiver),
        ))
    }
}

impl<S: BlobStore> Archiver<S> {
    /// Creates a new archiver
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for discovery and asset fetches
    /// * `store` - Blob store archived objects are written to
    /// * `static_url` - Public base URL archived objects are served from
    /// * `options` - Depth, concurrency and timeout settings
    pub fn new(client: Client, store: S, static_url: &str, options: ArchiverOptions) -> Self {
        Self {
            client,
            store: Arc::new(Mutex::new(store)),
            static_url: static_url.trim_end_matches('/').to_string(),
            options,
        }
    }

    /// Shared handle to the underlying blob store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Archives the site of `seed_url` under today's UTC date
    pub async fn archive(&self, seed_url: &str) -> Result<ArchiveReport> {
        self.archive_on(seed_url, Utc::now().date_naive()).await
    }

    /// Archives the site of `seed_url` under the given date
    ///
    /// # Process
    ///
    /// 1. Derive the archive domain (seed host without `www.`)
    /// 2. Discover assets from the seed page
    /// 3. Fetch every non-external asset, rewrite HTML and CSS, and store the
    ///    result under `{domain}/{date}{path}`
    /// 4. Report per-asset failures without failing the run
    ///
    /// # Returns
    ///
    /// * `Ok(ArchiveReport)` - The entry page was stored; the report lists any
    ///   other assets that failed
    /// * `Err(ArchiveError)` - Discovery failed, found nothing, or the entry
    ///   page could not be stored
    pub async fn archive_on(&self, seed_url: &str, date: NaiveDate) -> Result<ArchiveReport> {
        let seed = parse_absolute(seed_url.trim())?;
        let domain = archive_domain(&seed)
            .ok_or_else(|| UrlError::MissingHost(seed_url.to_string()))?;
        let context = ArchiveContext::new(&self.static_url, &domain, date);

        tracing::info!(
            "Starting archive of {} into {}/{}",
            seed,
            domain,
            context.date_segment()
        );

        let crawler = Crawler::new(self.client.clone(), seed.as_str(), self.options.max_depth)?;
        let entry_url = crawler.seed().to_string();
        let assets = crawler.discover().await?;

        if assets.is_empty() {
            return Err(ArchiveError::EmptyArchive { url: entry_url });
        }

        let mut assets_by_type = BTreeMap::new();
        for asset in &assets {
            *assets_by_type.entry(asset.asset_type).or_insert(0) += 1;
        }

        let skipped_external: Vec<String> = assets
            .iter()
            .filter(|asset| asset.is_external)
            .map(|asset| asset.url.clone())
            .collect();

        let rewriter = ContentRewriter::new(context.clone());
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));

        let archive_futures: Vec<_> = assets
            .iter()
            .filter(|asset| !asset.is_external)
            .map(|asset| {
                let semaphore = Arc::clone(&semaphore);
                let rewriter = &rewriter;

                async move {
                    let outcome = match semaphore.acquire().await {
                        Ok(_permit) => {
                            match tokio::time::timeout(
                                self.options.asset_timeout,
                                self.archive_asset(asset, rewriter),
                            )
                            .await
                            {
                                Ok(outcome) => outcome,
                                Err(_) => Err(ArchiveError::Timeout {
                                    url: asset.url.clone(),
                                }),
                            }
                        }
                        Err(e) => Err(ArchiveError::Fetch {
                            url: asset.url.clone(),
                            reason: format!("Worker pool closed: {}", e),
                        }),
                    };
                    (asset, outcome)
                }
            })
            .collect();

        let results = join_all(archive_futures).await;

        let mut stored = Vec::new();
        let mut failures = Vec::new();
        let mut entry_failure = None;

        for (asset, outcome) in results {
            match outcome {
                Ok(key) => stored.push(key),
                Err(e) => {
                    tracing::warn!("Failed to archive {}: {}", asset.url, e);
                    if asset.url == entry_url {
                        entry_failure = Some(e.to_string());
                    }
                    failures.push(AssetFailure {
                        url: asset.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(reason) = entry_failure {
            return Err(ArchiveError::EntryPageFailed {
                url: entry_url,
                reason,
            });
        }

        stored.sort();

        tracing::info!(
            "Archived {}: {} stored, {} failed, {} external skipped",
            entry_url,
            stored.len(),
            failures.len(),
            skipped_external.len()
        );

        Ok(ArchiveReport {
            preview_url: context.preview_url(),
            domain,
            date,
            discovered: assets.len(),
            assets_by_type,
            stored,
            skipped_external,
            failures,
        })
    }

    /// Fetches one asset, rewrites it if it is HTML or CSS, and stores it
    ///
    /// Returns the storage key written.
    async fn archive_asset(&self, asset: &Asset, rewriter: &ContentRewriter) -> Result<String> {
        let body = fetch_bytes(&self.client, &asset.url).await?;

        let body = match asset.asset_type {
            AssetType::Html => rewriter
                .rewrite_html(&decode_text(body), &asset.url)
                .into_bytes(),
            AssetType::Css => rewriter
                .rewrite_css(&decode_text(body), &asset.url)
                .into_bytes(),
            _ => body,
        };

        let context = rewriter.context();
        let key = context.storage_key(&asset.path);
        let options = PutOptions {
            content_type: content_type_for_path(&asset.path).to_string(),
            custom_metadata: BTreeMap::from([
                ("originalUrl".to_string(), asset.url.clone()),
                ("archivedAt".to_string(), context.date_segment()),
                ("assetType".to_string(), asset.asset_type.to_string()),
                ("domain".to_string(), context.domain.clone()),
            ]),
        };

        self.with_store(|store| store.put(&key, &body, &options))?;

        tracing::debug!("Stored {} as {}", asset.url, key);
        Ok(key)
    }

    /// Lists the archived dates for a domain, newest first
    ///
    /// Listing failures are logged and yield an empty list.
    pub fn list_archives(&self, domain: &str) -> Vec<String> {
        let options = ListOptions::children_of(format!("{}/", domain));

        match self.with_store(|store| store.list(&options)) {
            Ok(result) => {
                let dates: BTreeSet<&str> = result
                    .delimited_prefixes
                    .iter()
                    .map(String::as_str)
                    .chain(result.objects.iter().map(|object| object.key.as_str()))
                    .filter_map(|key| key.split('/').nth(1))
                    .filter(|segment| !segment.is_empty())
                    .collect();

                dates.into_iter().rev().map(str::to_string).collect()
            }
            Err(e) => {
                tracing::warn!("Failed to list archives for {}: {}", domain, e);
                Vec::new()
            }
        }
    }

    /// Counts the archived domains
    ///
    /// Listing failures are logged and yield zero.
    pub fn domain_count(&self) -> u64 {
        match self.with_store(|store| store.list(&ListOptions::top_level())) {
            Ok(result) => result.delimited_prefixes.len() as u64,
            Err(e) => {
                tracing::warn!("Failed to count archived domains: {}", e);
                0
            }
        }
    }

    /// Reads one archived object
    ///
    /// The key is built with [`object_key`], so an empty path or a path ending
    /// in `/` resolves to `index.html`.
    pub fn fetch_archived(
        &self,
        domain: &str,
        date: &str,
        path: &str,
    ) -> StorageResult<Option<StoredObject>> {
        let key = object_key(domain, date, path);
        self.with_store(|store| store.get(&key))
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut S) -> StorageResult<T>) -> StorageResult<T> {
        let mut store = self.store.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&mut *store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PutOptions;

    fn archiver_with(keys: &[&str]) -> Archiver<SqliteBlobStore> {
        let mut store = SqliteBlobStore::new_in_memory().unwrap();
        for key in keys {
            store.put(key, b"x", &PutOptions::default()).unwrap();
        }
        Archiver::new(
            Client::new(),
            store,
            "https://static.example.com/",
            ArchiverOptions::default(),
        )
    }

    #[test]
    fn test_list_archives_sorted_descending() {
        let archiver = archiver_with(&[
            "ex.com/2024-01-01/index.html",
            "ex.com/2024-03-01/index.html",
            "ex.com/2024-02-01/css/site.css",
            "other.com/2025-01-01/index.html",
        ]);

        assert_eq!(
            archiver.list_archives("ex.com"),
            vec!["2024-03-01", "2024-02-01", "2024-01-01"]
        );
        assert!(archiver.list_archives("missing.com").is_empty());
    }

    #[test]
    fn test_domain_count() {
        let archiver = archiver_with(&[
            "a.com/2024-01-01/index.html",
            "a.com/2024-01-02/index.html",
            "b.com/2024-01-01/index.html",
        ]);
        assert_eq!(archiver.domain_count(), 2);

        assert_eq!(archiver_with(&[]).domain_count(), 0);
    }

    #[test]
    fn test_fetch_archived_defaults_to_index() {
        let archiver = archiver_with(&[
            "ex.com/2024-01-01/index.html",
            "ex.com/2024-01-01/blog/index.html",
        ]);

        assert!(archiver.fetch_archived("ex.com", "2024-01-01", "").unwrap().is_some());
        assert!(archiver
            .fetch_archived("ex.com", "2024-01-01", "blog/")
            .unwrap()
            .is_some());
        assert!(archiver
            .fetch_archived("ex.com", "2024-01-01", "/index.html")
            .unwrap()
            .is_some());
        assert!(archiver
            .fetch_archived("ex.com", "2024-01-01", "nope.html")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_options_from_config() {
        let config = ArchiverConfig {
            max_depth: 2,
            concurrency: 3,
            request_timeout_secs: 10,
            asset_timeout_secs: 15,
        };
        let options = ArchiverOptions::from(&config);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.concurrency, 3);
        assert_eq!(options.asset_timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_archive_rejects_invalid_seed() {
        let archiver = archiver_with(&[]);
        let result = archiver.archive("not a url").await;
        assert!(matches!(result, Err(ArchiveError::Url(_))));
    }
}
