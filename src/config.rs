// src/config.rs
// =============================================================================
// Crawl configuration shared by the traversal engine, the HTTP fetcher and
// the downloader.
//
// Every knob lives in one plain struct that is built once (from the CLI) and
// passed by value into the components that need it. There is no global
// mutable default anywhere in the crate.
// =============================================================================

use std::time::Duration;

/// User-agent sent with every request (page fetches and downloads)
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default crawl depth (hops from the seed page)
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default pause between consecutive page fetches, in seconds
pub const DEFAULT_DELAY_SECS: f64 = 1.0;

// PDF payloads are larger than pages, so downloads get their own budget
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// Pages further than this many hops from the seed are never fetched
    pub max_depth: usize,
    /// Unconditional pause between consecutive fetches
    pub delay: Duration,
    /// Per-request timeout for HTML pages
    pub page_timeout: Duration,
    /// Per-request timeout for PDF downloads
    pub download_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            page_timeout: PAGE_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

// Parses a delay given in (possibly fractional) seconds
//
// Used as a clap value parser, so a bad value is reported at argument
// parsing time instead of panicking later.
pub fn parse_delay(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("delay must be a non-negative number, got '{}'", raw));
    }

    Duration::try_from_secs_f64(secs).map_err(|_| format!("delay '{}' is too large", raw))
}
