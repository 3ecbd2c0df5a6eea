use url::Url;

/// Derives the archive domain for a URL: its host with any leading `www.` removed
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_archiver::url::archive_domain;
///
/// let url = Url::parse("https://www.example.com/path").unwrap();
/// assert_eq!(archive_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://blog.example.com/").unwrap();
/// assert_eq!(archive_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn archive_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Returns true if both URLs point at the same hostname (ports are ignored)
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
