/// Converts a URL path into the canonical storage sub-path
///
/// # Sanitization Steps
///
/// 1. Strip everything from the first `?` or `#`
/// 2. Ensure a leading `/`
/// 3. Collapse consecutive `/` into one
/// 4. Paths ending in `/` get `index.html` appended
/// 5. Paths whose last segment has no extension get `/index.html` appended
///
/// The result always names a concrete file, and sanitizing twice yields the same
/// path as sanitizing once.
///
/// # Examples
///
/// ```
/// use site_archiver::url::sanitize_path;
///
/// assert_eq!(sanitize_path("/about"), "/about/index.html");
/// assert_eq!(sanitize_path("/blog//posts/"), "/blog/posts/index.html");
/// assert_eq!(sanitize_path("css/site.css?v=3"), "/css/site.css");
/// ```
pub fn sanitize_path(path: &str) -> String {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];

    let mut sanitized = String::with_capacity(path.len() + 12);
    sanitized.push('/');
    for c in path.chars() {
        if c == '/' && sanitized.ends_with('/') {
            continue;
        }
        sanitized.push(c);
    }

    if sanitized.ends_with('/') {
        sanitized.push_str("index.html");
    } else if extension(&sanitized).is_none() {
        sanitized.push_str("/index.html");
    }

    sanitized
}

/// Returns the lowercase extension of the last path segment, ignoring any query
/// string or fragment
///
/// # Examples
///
/// ```
/// use site_archiver::url::extension;
///
/// assert_eq!(extension("/css/site.CSS?v=1"), Some("css".to_string()));
/// assert_eq!(extension("/v1.2/guide"), None);
/// ```
pub fn extension(path: &str) -> Option<String> {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];
    let segment = path.rsplit('/').next().unwrap_or(path);

    segment
        .rfind('.')
        .map(|idx| segment[idx + 1..].to_ascii_lowercase())
}

/// Maps the path of a navigable page to the file it is archived as
///
/// Paths ending in `.html` are kept, directory paths get `index.html`, and any
/// other path is treated as a directory.
pub fn page_path(path: &str) -> String {
    if path.ends_with(".html") {
        path.to_string()
    } else if path.ends_with('/') {
        format!("{}index.html", path)
    } else {
        format!("{}/index.html", path)
    }
}
