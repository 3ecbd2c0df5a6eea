//! Same-origin asset discovery
//!
//! The [`Crawler`] walks the pages of one site depth-first from a seed page,
//! collecting every asset needed to render them. Discovery state (the visited
//! set and the asset list) belongs to one crawler instance and is consumed by
//! [`Crawler::discover`].

use crate::crawler::asset::{Asset, AssetType};
use crate::crawler::fetcher::fetch_text;
use crate::crawler::parser::{extract_references, PageReferences};
use crate::rewriter::extract_css_urls;
use crate::url::{extension, is_special_reference, page_path, parse_absolute, resolve_url, same_host};
use crate::{ArchiveError, Result};
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Default maximum link depth from the seed page
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Asset types accepted from `src`-like attributes
const EMBEDDED_TYPES: &[AssetType] = &[
    AssetType::Js,
    AssetType::Image,
    AssetType::Font,
    AssetType::Media,
    AssetType::Pdf,
    AssetType::Icon,
];

/// A page waiting to be visited
#[derive(Debug, Clone)]
struct PendingPage {
    url: String,
    path: String,
    depth: u32,
}

/// Discovers the assets of one site, starting from a seed page
///
/// # Traversal
///
/// Pages are visited depth-first from an explicit worklist, so the stack depth
/// stays constant no matter how deep the site is. For every page, its iframes
/// are explored before its links, each subtree fully before the next sibling.
///
/// # Failures
///
/// A page that fails to fetch is logged and skipped, unless it is the seed
/// page, in which case discovery fails. References that cannot be resolved are
/// skipped one at a time.
pub struct Crawler {
    client: Client,
    origin: Url,
    max_depth: u32,
    visited: HashSet<String>,
    registered: HashSet<String>,
    assets: Vec<Asset>,
}

impl Crawler {
    /// Creates a crawler for the site of `seed_url`
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every page and stylesheet fetch
    /// * `seed_url` - Absolute HTTP(S) URL of the entry page
    /// * `max_depth` - Maximum link depth to follow from the seed page
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to discover
    /// * `Err(ArchiveError)` - The seed URL is not an absolute HTTP(S) URL
    pub fn new(client: Client, seed_url: &str, max_depth: u32) -> Result<Self> {
        let mut origin = parse_absolute(seed_url.trim())?;
        origin.set_fragment(None);

        Ok(Self {
            client,
            origin,
            max_depth,
            visited: HashSet::new(),
            registered: HashSet::new(),
            assets: Vec::new(),
        })
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.origin
    }

    /// Walks the site and returns every discovered asset, in discovery order
    ///
    /// The seed page is stored as `/index.html`. Each absolute URL appears at
    /// most once in the result.
    pub async fn discover(mut self) -> Result<Vec<Asset>> {
        let seed = self.origin.to_string();
        let mut worklist = vec![PendingPage {
            url: seed.clone(),
            path: "/index.html".to_string(),
            depth: 0,
        }];

        while let Some(page) = worklist.pop() {
            if page.depth > self.max_depth || !self.visited.insert(page.url.clone()) {
                continue;
            }

            tracing::debug!("Processing HTML page: {} (depth: {})", page.url, page.depth);

            let html = match fetch_text(&self.client, &page.url).await {
                Ok(html) => html,
                Err(e) if page.url == seed => {
                    return Err(ArchiveError::Discovery {
                        url: seed,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to process HTML page {}: {}", page.url, e);
                    continue;
                }
            };

            self.register(Asset::new(
                page.url.as_str(),
                AssetType::Html,
                &page.path,
                page.depth,
            ));

            let refs = extract_references(&html);
            self.register_stylesheets(&refs.stylesheets, &page).await;
            self.register_embedded(&refs, &page);

            // Reverse so the first child is popped first
            let children = self.collect_children(&refs, &page);
            worklist.extend(children.into_iter().rev());
        }

        tracing::info!(
            "Discovered {} assets across {} visited URLs from {}",
            self.assets.len(),
            self.visited.len(),
            seed
        );

        Ok(self.assets)
    }

    /// Registers linked stylesheets and the assets their `url(...)` rules
    /// reference (one level deep)
    async fn register_stylesheets(&mut self, hrefs: &[String], page: &PendingPage) {
        for href in hrefs {
            let Some(css_url) = self.absolute(href, &page.url) else {
                continue;
            };
            let css_url_str = css_url.to_string();
            if !self.visited.insert(css_url_str.clone()) {
                continue;
            }

            self.register(Asset::new(
                css_url_str.as_str(),
                AssetType::Css,
                css_url.path(),
                page.depth,
            ));

            let css = match fetch_text(&self.client, &css_url_str).await {
                Ok(css) => css,
                Err(e) => {
                    tracing::warn!("Failed to process CSS {}: {}", css_url_str, e);
                    continue;
                }
            };

            for reference in extract_css_urls(&css) {
                let Some(nested) = self.absolute(&reference, &css_url_str) else {
                    continue;
                };
                let nested_str = nested.to_string();
                if self.visited.insert(nested_str.clone()) {
                    self.register(Asset::new(
                        nested_str.as_str(),
                        AssetType::from_path(nested.path()),
                        nested.path(),
                        page.depth,
                    ));
                }
            }
        }
    }

    /// Registers icons, `src`-like resources and inline CSS images
    fn register_embedded(&mut self, refs: &PageReferences, page: &PendingPage) {
        for href in &refs.icons {
            self.register_leaf(href, page, |_| Some(AssetType::Icon));
        }

        for src in &refs.sources {
            self.register_leaf(src, page, |asset_type| {
                EMBEDDED_TYPES.contains(&asset_type).then_some(asset_type)
            });
        }

        for reference in &refs.inline_css_urls {
            self.register_leaf(reference, page, |asset_type| {
                (asset_type == AssetType::Image).then_some(asset_type)
            });
        }
    }

    /// Registers one leaf asset if `accept` maps its extension type to a type
    /// to record
    fn register_leaf<F>(&mut self, reference: &str, page: &PendingPage, accept: F)
    where
        F: Fn(AssetType) -> Option<AssetType>,
    {
        let Some(url) = self.absolute(reference, &page.url) else {
            return;
        };
        let Some(asset_type) = accept(AssetType::from_path(url.path())) else {
            return;
        };

        let url_str = url.to_string();
        if self.visited.insert(url_str.clone()) {
            self.register(Asset::new(url_str, asset_type, url.path(), page.depth));
        }
    }

    /// Collects the pages to visit next: same-host iframes, then navigable links
    ///
    /// Cross-host iframes are registered as external assets instead.
    fn collect_children(&mut self, refs: &PageReferences, page: &PendingPage) -> Vec<PendingPage> {
        let mut children = Vec::new();

        for src in &refs.iframes {
            let Some(url) = self.absolute(src, &page.url) else {
                continue;
            };

            if same_host(&url, &self.origin) {
                children.push(PendingPage {
                    path: page_path(url.path()),
                    url: url.to_string(),
                    depth: page.depth + 1,
                });
            } else {
                tracing::debug!("Recording external iframe {}", url);
                self.register(Asset::external_iframe(
                    url.to_string(),
                    url.path(),
                    page.depth,
                ));
            }
        }

        for href in &refs.anchors {
            if is_special_reference(href) {
                continue;
            }
            let Some(url) = self.absolute(href, &page.url) else {
                continue;
            };
            if !same_host(&url, &self.origin) {
                continue;
            }

            let path = url.path();
            if path.ends_with(".html") || path.ends_with('/') || extension(path).is_none() {
                children.push(PendingPage {
                    path: page_path(path),
                    url: url.to_string(),
                    depth: page.depth + 1,
                });
            }
        }

        children
    }

    /// Resolves a reference against a document URL into a normalized absolute
    /// URL without fragment
    fn absolute(&self, reference: &str, base_url: &str) -> Option<Url> {
        if is_special_reference(reference) {
            return None;
        }

        match resolve_url(reference, base_url).and_then(|resolved| parse_absolute(&resolved)) {
            Ok(mut url) => {
                url.set_fragment(None);
                Some(url)
            }
            Err(e) => {
                tracing::debug!("Skipping reference '{}' on {}: {}", reference, base_url, e);
                None
            }
        }
    }

    /// Upserts an asset; the first registration of a URL wins
    fn register(&mut self, asset: Asset) {
        if self.registered.insert(asset.url.clone()) {
            self.assets.push(asset);
        }
    }
}
