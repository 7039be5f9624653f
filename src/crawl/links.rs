// src/crawl/links.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from broken markup the way a
//   browser does, so a sloppy page still yields its links
//
// We also use the `url` crate to:
// - Resolve relative URLs against the page URL
// - Drop fragments, so /a#one and /a#two come out as the same link
//
// The output keeps document order. The crawler enqueues links in the order
// we return them, which decides which pages are visited first.
// =============================================================================

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// The page could not be turned into a list of links
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid page URL '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

// Extracts every hyperlink from a page as an absolute URL
//
// Parameters:
//   page_url: the URL the page was fetched from (base for relative links)
//   html: the page content
//
// Returns: absolute http(s) URLs without fragments, in document order.
// Duplicates are kept; deduplication is the crawler's job.
//
// Example:
//   page_url = "https://example.com/docs/"
//   html = "<a href='a#top'>A</a> <a href='/x.pdf'>X</a>"
//   result = ["https://example.com/docs/a", "https://example.com/x.pdf"]
pub fn extract_links(page_url: &str, html: &str) -> Result<Vec<String>, ExtractError> {
    let base = Url::parse(page_url).map_err(|source| ExtractError::InvalidPageUrl {
        url: page_url.to_string(),
        source,
    })?;

    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        debug!(
            page = page_url,
            count = document.errors.len(),
            "recovered from malformed HTML"
        );
    }

    // Constant selector, parsing it cannot fail
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .collect();

    Ok(links)
}

// Resolves a link (possibly relative) to an absolute, fragment-free URL
//
// Skips:
// - fragment-only links (#section) which point back at the same page
// - mailto:, tel:, javascript: and data: links
// - anything that does not resolve to http or https
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    let lowered = href.to_ascii_lowercase();

    if href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("javascript:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}
