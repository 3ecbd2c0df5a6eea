//! Content rewriting module
//!
//! Turns every reference inside fetched HTML and CSS into a reference to the
//! archived copy, so a captured site is self-contained under the archive root.
//!
//! Rewriting is a pure string transform. A reference that cannot be resolved
//! is left exactly as written, and one bad reference never affects the rest of
//! the document.

mod css;
mod html;

pub use css::extract_css_urls;
pub(crate) use html::parse_srcset;

use crate::url::{is_special_reference, parse_absolute, resolve_url, same_host, ArchiveContext};
use css::{replace_css_urls, UrlQuote};
use html::rewrite_attributes;

/// Attributes whose value is a single reference on every tag
const REFERENCE_ATTRIBUTES: &[&str] = &["src", "href", "data-src", "ping", "poster", "background"];

/// Rewrites references in HTML and CSS into archive URLs for one archive run
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use site_archiver::{ArchiveContext, ContentRewriter};
///
/// let context = ArchiveContext::new(
///     "https://static/x",
///     "ex.com",
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// );
/// let rewriter = ContentRewriter::new(context);
///
/// let html = rewriter.rewrite_html(r#"<a href="/about">About</a>"#, "https://ex.com/");
/// assert_eq!(
///     html,
///     r#"<a href="https://static/x/ex.com/2024-01-01/about/index.html">About</a>"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    context: ArchiveContext,
}

impl ContentRewriter {
    /// Creates a rewriter for the given archive run
    pub fn new(context: ArchiveContext) -> Self {
        Self { context }
    }

    /// The archive run this rewriter maps references into
    pub fn context(&self) -> &ArchiveContext {
        &self.context
    }

    /// Rewrites an HTML document fetched from `base_url`
    ///
    /// # Rules
    ///
    /// - `<a href>`: same-host targets are rewritten; links to other hosts are
    ///   kept so the mirror still links out to the live web
    /// - `src`, `href`, `data-src`, `ping`, `poster`, `background` on other
    ///   tags are rewritten whatever their host
    /// - `srcset` candidates are rewritten one by one, keeping descriptors
    /// - every CSS `url(...)` in the document is rewritten, keeping its quoting
    /// - `#`, `javascript:`, `data:`, `blob:`, `mailto:` and `tel:` references
    ///   are never touched
    pub fn rewrite_html(&self, html: &str, base_url: &str) -> String {
        let html = rewrite_attributes(html, |tag, attr, value| match attr {
            "href" if tag == "a" => self.rewrite_anchor(value, base_url),
            "srcset" => self.rewrite_srcset(value, base_url),
            _ if REFERENCE_ATTRIBUTES.contains(&attr) => self.remap_reference(value, base_url),
            _ => None,
        });

        replace_css_urls(&html, |reference, quote| {
            self.remap_reference(reference, base_url)
                .map(|archived| quote.format(&archived))
        })
    }

    /// Rewrites a stylesheet fetched from `base_url`
    ///
    /// Every `url(...)` becomes `url("...")` pointing into the archive;
    /// `data:` URLs are left untouched.
    pub fn rewrite_css(&self, css: &str, base_url: &str) -> String {
        replace_css_urls(css, |reference, _| {
            self.remap_reference(reference, base_url)
                .map(|archived| UrlQuote::Double.format(&archived))
        })
    }

    /// Maps a single reference to its archive URL, or `None` to keep it as is
    fn remap_reference(&self, reference: &str, base_url: &str) -> Option<String> {
        let reference = reference.trim();
        if is_special_reference(reference) {
            return None;
        }

        match resolve_url(reference, base_url).and_then(|resolved| parse_absolute(&resolved)) {
            Ok(resolved) => Some(self.context.archive_url(&resolved)),
            Err(e) => {
                tracing::debug!("Leaving reference '{}' unrewritten: {}", reference, e);
                None
            }
        }
    }

    fn rewrite_anchor(&self, href: &str, base_url: &str) -> Option<String> {
        let href = href.trim();
        if is_special_reference(href) {
            return None;
        }

        let base = parse_absolute(base_url).ok()?;
        let target = match resolve_url(href, base_url).and_then(|resolved| parse_absolute(&resolved)) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("Leaving link '{}' unrewritten: {}", href, e);
                return None;
            }
        };

        same_host(&target, &base).then(|| self.context.archive_url(&target))
    }

    fn rewrite_srcset(&self, srcset: &str, base_url: &str) -> Option<String> {
        let mut changed = false;
        let entries: Vec<String> = parse_srcset(srcset)
            .into_iter()
            .map(|candidate| {
                let url = match self.remap_reference(candidate.url, base_url) {
                    Some(archived) => {
                        changed = true;
                        archived
                    }
                    None => candidate.url.to_string(),
                };
                if candidate.descriptors.is_empty() {
                    url
                } else {
                    format!("{} {}", url, candidate.descriptors)
                }
            })
            .collect();

        changed.then(|| entries.join(", "))
    }
}
