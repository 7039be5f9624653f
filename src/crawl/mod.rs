// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Submodules:
// - scope: which pages may be fetched (same host, same path prefix)
// - links: pulls absolute links out of an HTML page
// - classify: tells PDF links apart from page links
// - queue: the breadth-first crawl that ties them together
//
// Features:
// - Breadth-first crawling starting from a URL
// - Stays on the seed's host and below the seed's path
// - Configurable depth limit
// - Polite crawling with a fixed delay between requests
// - Reports every PDF link it sees, even ones hosted elsewhere
// =============================================================================

mod classify;
mod links;
mod queue;
mod scope;

// Re-export the public API of the crawler
pub use classify::looks_like_pdf;
pub use links::{extract_links, ExtractError};
pub use queue::{CrawlEvent, CrawlFailure, CrawlResult, Crawler, FailureKind};
pub use scope::{is_in_scope, normalize, parse_seed, ScopePolicy, SeedError};
