// src/lib.rs
// =============================================================================
// pdf-scout: find (and download) every PDF linked from a section of a site.
//
// Modules:
// - config: crawl settings (depth, delay, timeouts, user-agent)
// - fetch: HTTP GET behind the `Fetcher` trait
// - crawl: scope rules, link extraction, PDF detection and the BFS crawl
// - download: saving PDFs to disk and reading/writing URL lists
// - logging: tracing subscriber setup for the binary
// =============================================================================

pub mod config;
pub mod crawl;
pub mod download;
pub mod fetch;
pub mod logging;

pub use config::CrawlConfig;
pub use crawl::{CrawlEvent, CrawlResult, Crawler};
pub use download::{DownloadSummary, Downloader};
pub use fetch::{FetchError, FetchResponse, Fetcher, HttpFetcher};
