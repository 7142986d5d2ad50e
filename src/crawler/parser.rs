//! HTML link extraction
//!
//! Turns a downloaded HTML body into the absolute http(s) URLs it points at.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose `href` is followed
const LINK_SELECTOR: &str = "a[href], area[href], link[rel~='canonical'][href]";

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];

/// Extracts every followable link from an HTML document
///
/// Links come from `<a>`, `<area>` and `<link rel="canonical">` elements, in
/// document order. Relative hrefs resolve against the document's `<base href>`
/// when it has one, otherwise against `page_url`. Fragments are dropped, and
/// anything that does not resolve to http(s) is skipped, as are anchors marked
/// `download`. Duplicates are kept; the crawl frontier deduplicates.
///
/// # Example
///
/// ```
/// use bfs_crawler::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &page_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| !is_download_anchor(element))
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve(href, &base))
        .collect()
}

/// Returns the URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

fn is_download_anchor(element: &ElementRef) -> bool {
    element.value().name() == "a" && element.value().attr("download").is_some()
}

/// Resolves `href` against `base`, or None if it is not worth following
fn resolve(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);
    Some(url.into())
}
