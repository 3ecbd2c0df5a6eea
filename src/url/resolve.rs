use crate::{UrlError, UrlResult};
use url::Url;

/// Reference prefixes that are never resolved, followed, or rewritten
const SPECIAL_PREFIXES: &[&str] = &["#", "javascript:", "data:", "blob:", "mailto:", "tel:"];

/// Resolves a raw reference found in markup against the URL of the document
/// that contains it
///
/// # Resolution Rules
///
/// 1. `data:` and `blob:` references are rejected with `UnsupportedScheme`
/// 2. References starting with `http` are already absolute and returned unchanged
/// 3. Protocol-relative references (`//host/path`) are promoted to `https:`
/// 4. Everything else is merged with `base_url` using standard relative-URL rules
///
/// # Examples
///
/// ```
/// use site_archiver::url::resolve_url;
///
/// let url = resolve_url("//cdn.example.com/app.js", "https://example.com/").unwrap();
/// assert_eq!(url, "https://cdn.example.com/app.js");
///
/// let url = resolve_url("../img/logo.png", "https://example.com/blog/post/").unwrap();
/// assert_eq!(url, "https://example.com/blog/img/logo.png");
///
/// assert!(resolve_url("data:image/png;base64,AAAA", "https://example.com/").is_err());
/// ```
pub fn resolve_url(reference: &str, base_url: &str) -> UrlResult<String> {
    let reference = reference.trim();

    if let Some(scheme) = ["data:", "blob:"]
        .iter()
        .find(|scheme| starts_with_ignore_case(reference, scheme))
    {
        return Err(UrlError::UnsupportedScheme(scheme.trim_end_matches(':').to_string()));
    }

    if reference.starts_with("http") {
        return Ok(reference.to_string());
    }

    if reference.starts_with("//") {
        return Ok(format!("https:{}", reference));
    }

    let base = Url::parse(base_url)
        .map_err(|e| UrlError::Malformed(format!("base '{}': {}", base_url, e)))?;

    base.join(reference)
        .map(|url| url.to_string())
        .map_err(|e| UrlError::Malformed(format!("'{}': {}", reference, e)))
}

/// Parses an absolute URL produced by [`resolve_url`], accepting only HTTP(S)
/// URLs that carry a host
pub fn parse_absolute(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Malformed(format!("'{}': {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}

/// Returns true if the reference is empty or uses a scheme that is left verbatim
/// (fragments, `javascript:`, `data:`, `blob:`, `mailto:`, `tel:`)
pub fn is_special_reference(reference: &str) -> bool {
    let reference = reference.trim();
    reference.is_empty()
        || SPECIAL_PREFIXES
            .iter()
            .any(|prefix| starts_with_ignore_case(reference, prefix))
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
