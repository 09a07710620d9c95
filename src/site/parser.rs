//! Site map index parser
//!
//! Extracts candidate links from an index page. Two shapes are understood:
//! - HTML index pages: `<a href="...">` links
//! - XML sitemaps: `<loc>` entries, where a `<sitemapindex>` lists nested
//!   sitemaps rather than pages

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Links found on one index page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIndex {
    /// Candidate page or sub-index links (absolute, de-duplicated, in document order)
    pub links: Vec<String>,

    /// Nested sitemaps listed by an XML sitemap index
    pub nested_sitemaps: Vec<String>,
}

/// Parses an index page body and extracts its links
///
/// # Arguments
///
/// * `body` - The page body (HTML or XML)
/// * `base_url` - The URL the body was fetched from, for resolving relative links
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::site::parse_index;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/recipes/1">Soup</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/sitemap").unwrap();
/// let parsed = parse_index(html, &base_url);
/// assert_eq!(parsed.links, vec!["https://example.com/recipes/1".to_string()]);
/// ```
pub fn parse_index(body: &str, base_url: &Url) -> ParsedIndex {
    let document = Html::parse_document(body);
    let mut seen = HashSet::new();
    let mut parsed = ParsedIndex::default();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if seen.insert(absolute_url.clone()) {
                        parsed.links.push(absolute_url);
                    }
                }
            }
        }
    }

    if let Ok(loc_selector) = Selector::parse("loc") {
        let nested: HashSet<_> = Selector::parse("sitemapindex loc")
            .map(|s| document.select(&s).map(|e| e.id()).collect())
            .unwrap_or_default();

        for element in document.select(&loc_selector) {
            let text = element.text().collect::<String>();
            let Some(absolute_url) = resolve_link(&text, base_url) else {
                continue;
            };
            if !seen.insert(absolute_url.clone()) {
                continue;
            }

            if nested.contains(&element.id()) {
                parsed.nested_sitemaps.push(absolute_url);
            } else {
                parsed.links.push(absolute_url);
            }
        }
    }

    parsed
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// Fragments are stripped so `/page#top` and `/page` are the same link.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}
