//! HTML parser for extracting visible text and links
//!
//! This module turns a fetched HTML body into:
//! - The visible text used for term matching
//! - The outbound links offered to the frontier

use crate::url::CrawlUrl;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Visible text, whitespace-collapsed
    pub text: String,

    /// Outbound links: absolute, normalized, deduplicated, in document order
    pub links: Vec<CrawlUrl>,
}

/// Parses HTML content and extracts visible text and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to http or https
///
/// The html5ever parser recovers from malformed markup, so parsing itself never
/// fails; badly broken pages just yield less text and fewer links.
///
/// # Example
///
/// ```
/// use sift_crawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// assert_eq!(parsed.text, "Link");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        text: extract_visible_text(&document),
        links: extract_links(&document, base_url),
    }
}

/// Collects text nodes that are not inside a hidden element
fn extract_visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<CrawlUrl> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let mut push = |href: &str| {
        if let Some(url) = resolve_link(href, base_url) {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    };

    if let Ok(selector) = Selector::parse("a[href], area[href], link[rel='canonical'][href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    links
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<CrawlUrl> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    CrawlUrl::from_url(absolute_url).ok()
}
