// src/fetch/mod.rs
// =============================================================================
// This module performs HTTP GET requests for the crawler and the downloader.
//
// Submodules:
// - http: the real fetcher, backed by one pooled reqwest client per run
//
// The `Fetcher` trait is the seam between the traversal engine and the
// network. The engine only ever sees a typed result: a response with a 2xx
// status, or a `FetchError` saying why there is no usable response. A
// failure is data the engine inspects, never a panic or an early return.
// =============================================================================

mod http;

use std::time::Duration;
use thiserror::Error;

pub use http::HttpFetcher;

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Why a fetch produced no usable response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("could not resolve hostname")]
    Dns,

    #[error("SSL/TLS error")]
    Tls,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// True when the server answered, but with a non-2xx status
    pub fn is_http_status(&self) -> bool {
        matches!(self, FetchError::HttpStatus(_))
    }
}

// Anything that can GET a URL within a time budget
//
// The page crawl calls it with the page timeout, the downloader with the
// download timeout. Calls are always sequential.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError>;
}
