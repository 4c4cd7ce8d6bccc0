use crate::UrlError;
use std::fmt;
use url::Url;

/// Query parameters that never change page content
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// A normalized absolute HTTP(S) URL
///
/// Two `CrawlUrl`s compare equal exactly when they refer to the same crawl
/// identity. Construct one with [`normalize_url`] or [`CrawlUrl::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlUrl(Url);

impl CrawlUrl {
    /// Parses and normalizes a URL string
    pub fn parse(url_str: &str) -> Result<Self, UrlError> {
        normalize_url(url_str)
    }

    /// Normalizes an already-parsed URL
    pub fn from_url(url: Url) -> Result<Self, UrlError> {
        normalize(url).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CrawlUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CrawlUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Parses and normalizes a URL into its crawl identity
///
/// The scheme must be http or https and is kept as given. The host is
/// lower-cased and a default port dropped. The path loses dot segments, empty
/// segments and any trailing slash (the root stays `/`). The fragment and
/// tracking parameters are removed; the remaining query segments are sorted
/// but otherwise left exactly as written.
///
/// # Examples
///
/// ```
/// use sift_crawl::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/wiki/Algorithm/#History").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/wiki/Algorithm");
/// ```
pub fn normalize_url(url_str: &str) -> Result<CrawlUrl, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    CrawlUrl::from_url(url)
}

fn normalize(mut url: Url) -> Result<Url, UrlError> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let path = clean_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if let Some(query) = clean_query(url.query()) {
        url.set_query(query.as_deref());
    }

    Ok(url)
}

/// Resolves `.` and `..` segments, drops empty segments and any trailing slash
fn clean_path(path: &str) -> String {
    let segments = path.split('/').fold(Vec::new(), |mut kept, segment| {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            _ => kept.push(segment),
        }
        kept
    });

    let mut cleaned = String::with_capacity(path.len());
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// Drops tracking parameters and sorts the remaining `&`-separated segments
///
/// Segments are kept byte for byte, so a valueless key stays valueless and no
/// percent-encoding is rewritten. Returns None when there is no query to touch,
/// Some(None) when the query should be removed entirely.
fn clean_query(query: Option<&str>) -> Option<Option<String>> {
    let query = query?;
    let mut kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let key = segment.split_once('=').map_or(*segment, |(key, _)| key);
            !is_tracking_param(key)
        })
        .collect();

    if kept.is_empty() {
        return Some(None);
    }
    kept.sort_unstable();
    Some(Some(kept.join("&")))
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
