//! HTML parser for extracting references during discovery
//!
//! This module parses a fetched page and collects the raw (unresolved)
//! references the crawler cares about:
//! - Stylesheets and icons from `<link>` tags
//! - Embedded resources from `src`, `data-src`, `poster` and `srcset`
//! - `url(...)` references in `<style>` blocks and `style` attributes
//! - Iframe sources and anchor targets
//!
//! Parsing happens entirely inside [`extract_references`] so the parsed
//! document never lives across an await point.

use crate::rewriter::{extract_css_urls, parse_srcset};
use crate::url::extension;
use scraper::{Html, Selector};

/// Raw references extracted from one HTML page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReferences {
    /// `<link href>` targets ending in `.css`
    pub stylesheets: Vec<String>,

    /// `<link rel="icon" | "shortcut icon" | "apple-touch-icon">` targets
    pub icons: Vec<String>,

    /// `src`, `data-src`, `poster` and `srcset` candidates on non-iframe elements
    pub sources: Vec<String>,

    /// `url(...)` references in inline CSS
    pub inline_css_urls: Vec<String>,

    /// `<iframe src>` targets
    pub iframes: Vec<String>,

    /// `<a href>` targets
    pub anchors: Vec<String>,
}

/// Parses HTML content and extracts every reference used for discovery
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The extracted references. Malformed markup never fails; the parser
/// recovers and yields whatever it can find.
///
/// # Example
///
/// ```
/// use site_archiver::crawler::extract_references;
///
/// let html = r#"<link rel="stylesheet" href="/site.css"><a href="/about">About</a>"#;
/// let refs = extract_references(html);
/// assert_eq!(refs.stylesheets, vec!["/site.css"]);
/// assert_eq!(refs.anchors, vec!["/about"]);
/// ```
pub fn extract_references(html: &str) -> PageReferences {
    let document = Html::parse_document(html);
    let mut refs = PageReferences::default();

    extract_link_tags(&document, &mut refs);
    extract_sources(&document, &mut refs);
    extract_inline_css(&document, &mut refs);

    refs.iframes = select_attr(&document, "iframe[src]", "src");
    refs.anchors = select_attr(&document, "a[href]", "href");

    refs
}

/// Collects stylesheet and icon links
fn extract_link_tags(document: &Html, refs: &mut PageReferences) {
    let Ok(selector) = Selector::parse("link[href]") else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let rel = element
            .value()
            .attr("rel")
            .unwrap_or("")
            .to_ascii_lowercase();

        if extension(href).as_deref() == Some("css") {
            refs.stylesheets.push(href.to_string());
        } else if rel.split_whitespace().any(|token| token.ends_with("icon")) {
            refs.icons.push(href.to_string());
        }
    }
}

/// Collects embedded resource references from every element except iframes
fn extract_sources(document: &Html, refs: &mut PageReferences) {
    let Ok(selector) = Selector::parse("[src], [data-src], [poster], [srcset]") else {
        return;
    };

    for element in document.select(&selector) {
        let value = element.value();
        if value.name() == "iframe" {
            continue;
        }

        for attr in ["src", "data-src", "poster"] {
            if let Some(reference) = value.attr(attr).map(str::trim) {
                if !reference.is_empty() {
                    refs.sources.push(reference.to_string());
                }
            }
        }

        if let Some(srcset) = value.attr("srcset") {
            refs.sources
                .extend(parse_srcset(srcset).into_iter().map(|c| c.url.to_string()));
        }
    }
}

/// Collects `url(...)` references from `<style>` blocks and `style` attributes
fn extract_inline_css(document: &Html, refs: &mut PageReferences) {
    if let Ok(selector) = Selector::parse("style") {
        for element in document.select(&selector) {
            let css: String = element.text().collect();
            refs.inline_css_urls.extend(extract_css_urls(&css));
        }
    }

    if let Ok(selector) = Selector::parse("[style]") {
        for element in document.select(&selector) {
            if let Some(style) = element.value().attr("style") {
                refs.inline_css_urls.extend(extract_css_urls(style));
            }
        }
    }
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheets_and_icons() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/css/site.css?v=3">
            <link rel="icon" href="/favicon.ico">
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="canonical" href="https://example.com/">
        </head></html>"#;

        let refs = extract_references(html);
        assert_eq!(refs.stylesheets, vec!["/css/site.css?v=3"]);
        assert_eq!(refs.icons, vec!["/favicon.ico", "/touch.png"]);
    }

    #[test]
    fn test_sources_exclude_iframes() {
        let html = r#"<body>
            <script src="/app.js"></script>
            <img src="/a.png" srcset="/a-2x.png 2x, /a-3x.png 3x">
            <img data-src="/lazy.jpg">
            <video poster="/poster.jpg"><source src="/clip.mp4"></video>
            <iframe src="/embed.html"></iframe>
        </body>"#;

        let refs = extract_references(html);
        assert_eq!(
            refs.sources,
            vec![
                "/app.js",
                "/a.png",
                "/a-2x.png",
                "/a-3x.png",
                "/lazy.jpg",
                "/poster.jpg",
                "/clip.mp4"
            ]
        );
        assert_eq!(refs.iframes, vec!["/embed.html"]);
    }

    #[test]
    fn test_inline_css_urls() {
        let html = r#"<head><style>body { background: url("/bg.png") }</style></head>
            <body><div style="background-image: url('/hero.jpg')"></div></body>"#;

        let refs = extract_references(html);
        assert_eq!(refs.inline_css_urls, vec!["/bg.png", "/hero.jpg"]);
    }

    #[test]
    fn test_anchors_in_document_order() {
        let html = r#"<a href="/one">1</a><a name="x">no href</a><a href=" /two ">2</a><a href="">empty</a>"#;
        let refs = extract_references(html);
        assert_eq!(refs.anchors, vec!["/one", "/two"]);
    }

    #[test]
    fn test_malformed_markup() {
        let html = r#"<div><a href="/ok">ok<img src="/x.png"</div><p>unclosed"#;
        let refs = extract_references(html);
        assert_eq!(refs.anchors, vec!["/ok"]);
    }
}
