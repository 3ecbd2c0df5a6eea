//! CSS `url(...)` scanning and rewriting

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Matches `url(...)` with a double-quoted, single-quoted, or bare argument
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#)
        .expect("CSS url pattern is valid")
});

/// Quoting style of a `url(...)` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UrlQuote {
    Double,
    Single,
    Bare,
}

impl UrlQuote {
    /// Formats a reference as a `url(...)` token with this quoting
    pub(crate) fn format(self, reference: &str) -> String {
        match self {
            UrlQuote::Double => format!("url(\"{}\")", reference.replace('"', "%22")),
            UrlQuote::Single => format!("url('{}')", reference.replace('\'', "%27")),
            UrlQuote::Bare => format!(
                "url({})",
                reference.replace('(', "%28").replace(')', "%29")
            ),
        }
    }
}

fn reference_of<'a>(caps: &'a Captures<'_>) -> (&'a str, UrlQuote) {
    if let Some(m) = caps.get(1) {
        (m.as_str(), UrlQuote::Double)
    } else if let Some(m) = caps.get(2) {
        (m.as_str(), UrlQuote::Single)
    } else {
        (caps.get(3).map_or("", |m| m.as_str()), UrlQuote::Bare)
    }
}

/// Extracts every `url(...)` argument from CSS text, in document order
///
/// Empty arguments and `data:` URIs are dropped.
///
/// # Example
///
/// ```
/// use site_archiver::rewriter::extract_css_urls;
///
/// let urls = extract_css_urls(r#"body { background: url("/bg.png") } @font-face { src: url(f.woff2) }"#);
/// assert_eq!(urls, vec!["/bg.png", "f.woff2"]);
/// ```
pub fn extract_css_urls(css: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(css)
        .map(|caps| reference_of(&caps).0.trim().to_string())
        .filter(|reference| {
            !reference.is_empty() && !reference.to_ascii_lowercase().starts_with("data:")
        })
        .collect()
}

/// Replaces every `url(...)` argument for which `remap` returns a new reference
///
/// `remap` receives the trimmed argument and the quoting it was written with,
/// and returns the full replacement token, or `None` to keep the original
/// text.
pub(crate) fn replace_css_urls<F>(text: &str, mut remap: F) -> String
where
    F: FnMut(&str, UrlQuote) -> Option<String>,
{
    CSS_URL
        .replace_all(text, |caps: &Captures<'_>| {
            let (reference, quote) = reference_of(caps);
            remap(reference.trim(), quote).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
