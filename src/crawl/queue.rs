// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl itself: a breadth-first walk over the
// pages of one site section, collecting every PDF link it sees.
//
// How it works:
// 1. Start with the seed URL in a queue at depth 0
// 2. Take the front of the queue; skip it if it is deeper than max_depth
// 3. Fetch the page (a failure is recorded and we move on)
// 4. Extract its links, in document order
// 5. PDF links are recorded (from any host) but never crawled
// 6. Other in-scope links not seen before are queued at depth + 1
// 7. Repeat until the queue is empty
//
// A URL is marked as seen the moment it is queued, not when it is fetched,
// so no page is ever queued (or fetched) twice.
//
// Politeness:
// - One request at a time
// - A fixed pause between consecutive page fetches, even after a failure
// =============================================================================

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

use super::classify::looks_like_pdf;
use super::links::extract_links;
use super::scope::{is_in_scope, normalize, parse_seed, ScopePolicy, SeedError};
use crate::config::CrawlConfig;
use crate::fetch::{FetchError, Fetcher};

// A page waiting in the queue
#[derive(Debug, Clone)]
struct CrawlTarget {
    url: String,
    depth: usize, // Hops from the seed page (seed = 0)
}

/// What went wrong with a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Timeout, refused connection, DNS, TLS, unreadable body...
    Network,
    /// The server answered with a non-2xx status
    HttpStatus,
    /// The page was fetched but its links could not be extracted
    Parse,
}

impl From<&FetchError> for FailureKind {
    fn from(error: &FetchError) -> Self {
        if error.is_http_status() {
            FailureKind::HttpStatus
        } else {
            FailureKind::Network
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub depth: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Everything one crawl run found
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlResult {
    /// Seed URL, normalized
    pub seed: String,
    /// Pages fetched successfully, in visiting order
    pub visited: Vec<String>,
    /// PDF links, deduplicated, in discovery order
    pub pdfs: Vec<String>,
    pub pages_scanned: usize,
    pub error_count: usize,
    pub failures: Vec<CrawlFailure>,
    #[serde(skip)]
    seen_pdfs: HashSet<String>,
}

impl CrawlResult {
    fn new(seed: String) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    fn record_visit(&mut self, url: &str) {
        self.visited.push(url.to_string());
        self.pages_scanned += 1;
    }

    // Returns false when the PDF was already known
    fn record_pdf(&mut self, url: &str) -> bool {
        if !self.seen_pdfs.insert(url.to_string()) {
            return false;
        }
        self.pdfs.push(url.to_string());
        true
    }

    fn record_failure(&mut self, failure: CrawlFailure) {
        self.error_count += 1;
        self.failures.push(failure);
    }
}

/// Progress notifications, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlEvent<'a> {
    Fetching { url: &'a str, depth: usize },
    PageVisited { url: &'a str, depth: usize },
    PageFailed { url: &'a str, depth: usize, kind: FailureKind, message: &'a str },
    PdfFound { url: &'a str, found_on: &'a str },
}

// The breadth-first crawler
//
// Generic over the fetcher so tests can crawl an in-memory site.
pub struct Crawler<F> {
    fetcher: F,
    config: CrawlConfig,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Hands the fetcher back, so downloads can reuse its connection pool
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    pub async fn crawl(&self, seed: &str) -> Result<CrawlResult, SeedError> {
        self.crawl_with(seed, |_| {}).await
    }

    // Crawls from `seed`, reporting progress to `observer`
    //
    // The only error is a seed that cannot be crawled at all. Once the walk
    // starts, every failure is recorded in the result and the walk goes on.
    pub async fn crawl_with<O>(&self, seed: &str, mut observer: O) -> Result<CrawlResult, SeedError>
    where
        O: FnMut(CrawlEvent<'_>),
    {
        let seed_url = parse_seed(seed)?;
        let policy = ScopePolicy::from_seed(&seed_url)?;
        let seed = normalize(&seed_url);

        info!(
            seed = %seed,
            domain = policy.base_domain(),
            path = policy.base_path(),
            max_depth = self.config.max_depth,
            "starting crawl"
        );

        let mut visited = HashSet::from([seed.clone()]);
        let mut queue = VecDeque::from([CrawlTarget {
            url: seed.clone(),
            depth: 0,
        }]);
        let mut result = CrawlResult::new(seed);
        let mut fetched_any = false;

        while let Some(target) = queue.pop_front() {
            if target.depth > self.config.max_depth {
                debug!(url = %target.url, depth = target.depth, "beyond max depth, not fetched");
                continue;
            }

            if fetched_any && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
            fetched_any = true;

            observer(CrawlEvent::Fetching {
                url: &target.url,
                depth: target.depth,
            });

            let response = match self.fetcher.fetch(&target.url, self.config.page_timeout).await {
                Ok(response) => response,
                Err(e) => {
                    info!(url = %target.url, error = %e, "failed to fetch page");
                    let failure = CrawlFailure {
                        url: target.url.clone(),
                        depth: target.depth,
                        kind: FailureKind::from(&e),
                        message: e.to_string(),
                    };
                    report_failure(&mut observer, &failure);
                    result.record_failure(failure);
                    continue;
                }
            };

            result.record_visit(&target.url);
            observer(CrawlEvent::PageVisited {
                url: &target.url,
                depth: target.depth,
            });

            let links = match extract_links(&target.url, &response.text()) {
                Ok(links) => links,
                Err(e) => {
                    info!(url = %target.url, error = %e, "failed to extract links");
                    let failure = CrawlFailure {
                        url: target.url.clone(),
                        depth: target.depth,
                        kind: FailureKind::Parse,
                        message: e.to_string(),
                    };
                    report_failure(&mut observer, &failure);
                    result.record_failure(failure);
                    continue;
                }
            };

            for link in links {
                if looks_like_pdf(&link) {
                    // PDFs are leaves: reported from any host, never queued
                    if result.record_pdf(&link) {
                        debug!(pdf = %link, page = %target.url, "found PDF");
                        observer(CrawlEvent::PdfFound {
                            url: &link,
                            found_on: &target.url,
                        });
                    }
                } else if is_in_scope(&link, &policy) && visited.insert(link.clone()) {
                    queue.push_back(CrawlTarget {
                        url: link,
                        depth: target.depth + 1,
                    });
                }
            }
        }

        info!(
            pages = result.pages_scanned,
            pdfs = result.pdfs.len(),
            errors = result.error_count,
            "crawl complete"
        );

        Ok(result)
    }
}

fn report_failure<O: FnMut(CrawlEvent<'_>)>(observer: &mut O, failure: &CrawlFailure) {
    observer(CrawlEvent::PageFailed {
        url: &failure.url,
        depth: failure.depth,
        kind: failure.kind,
        message: &failure.message,
    });
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why mark URLs as visited when they are queued?
//    - A page linked from ten other pages would otherwise sit in the queue
//      ten times
//    - Checking "already queued" at enqueue time keeps each URL in the queue
//      at most once, which also means it is fetched at most once
//
// 2. Why are deeper links still queued?
//    - A link found at depth max_depth is queued at max_depth + 1 and then
//      dropped when it reaches the front. It still counts as visited, which
//      is harmless: it could never be fetched in this run anyway
//
// 3. Why report off-site PDFs?
//    - Sites often host their documents on a CDN or a different section
//    - Scope only limits which pages we fetch, not which PDFs we report
// -----------------------------------------------------------------------------
