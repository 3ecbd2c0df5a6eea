use crate::url::sanitize_path;
use chrono::NaiveDate;
use url::Url;

/// The fixed coordinates of one archive run
///
/// The date is computed once when the run starts and carried through every
/// component, so storage keys and rewritten links always agree even if the run
/// crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContext {
    /// Public base URL that archived objects are served from (no trailing slash)
    pub static_root: String,

    /// Archive domain (seed host without `www.`)
    pub domain: String,

    /// Calendar date of the run
    pub date: NaiveDate,
}

impl ArchiveContext {
    /// Creates a new context, trimming any trailing slash from the static root
    pub fn new(static_root: &str, domain: &str, date: NaiveDate) -> Self {
        Self {
            static_root: static_root.trim_end_matches('/').to_string(),
            domain: domain.to_string(),
            date,
        }
    }

    /// The date segment used in keys and URLs (`YYYY-MM-DD`)
    pub fn date_segment(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Storage key for a canonical asset path: `{domain}/{date}{path}`
    pub fn storage_key(&self, path: &str) -> String {
        format!("{}/{}{}", self.domain, self.date_segment(), path)
    }

    /// Archive URL that a resolved reference is rewritten to
    ///
    /// Every reference is mapped into this run's namespace regardless of its
    /// original host.
    pub fn archive_url(&self, resolved: &Url) -> String {
        format!(
            "{}/{}/{}{}",
            self.static_root,
            self.domain,
            self.date_segment(),
            sanitize_path(resolved.path())
        )
    }

    /// Public URL of the archived entry page
    pub fn preview_url(&self) -> String {
        format!(
            "{}/{}/{}/index.html",
            self.static_root,
            self.domain,
            self.date_segment()
        )
    }
}

/// Storage key for a path requested under an archived domain and date
///
/// A leading `/` is ignored; an empty path or one ending in `/` resolves to
/// its `index.html`.
pub fn object_key(domain: &str, date: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() || path.ends_with('/') {
        format!("{}/{}/{}index.html", domain, date, path)
    } else {
        format!("{}/{}/{}", domain, date, path)
    }
}
