// src/crawl/scope.rs
// =============================================================================
// Decides which pages the crawler is allowed to fetch.
//
// A crawl is pinned to the seed's host and path: starting from
// https://example.com/docs we only ever fetch http(s) pages on example.com
// (with or without "www.") whose path starts with /docs.
//
// Also home to URL normalization. Fragments (#...) are stripped everywhere,
// so /a#one and /a#two are one and the same page.
// =============================================================================

use thiserror::Error;
use url::Url;

/// The seed URL cannot start a crawl
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid URL '{url}': {source}")]
    Invalid {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in '{url}' (only http and https can be crawled)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("URL has no host: {0}")]
    NoHost(String),
}

// Where a crawl may go, fixed once from the seed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    base_domain: String,
    base_path: String,
    port: Option<u16>,
}

impl ScopePolicy {
    pub fn from_seed(seed: &Url) -> Result<Self, SeedError> {
        if !is_web_scheme(seed) {
            return Err(SeedError::UnsupportedScheme {
                url: seed.to_string(),
                scheme: seed.scheme().to_string(),
            });
        }

        let host = seed
            .host_str()
            .ok_or_else(|| SeedError::NoHost(seed.to_string()))?;

        Ok(Self {
            base_domain: canonical_host(host),
            base_path: seed.path().to_string(),
            port: seed.port(),
        })
    }

    /// Host every page must live on (lowercase, no leading "www.")
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Path prefix every page must start with
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn allows(&self, url: &Url) -> bool {
        if !is_web_scheme(url) {
            return false;
        }

        let same_host = url
            .host_str()
            .map(|host| canonical_host(host) == self.base_domain)
            .unwrap_or(false);

        same_host && url.port() == self.port && url.path().starts_with(&self.base_path)
    }
}

// Parses and validates a seed URL, returning it with its fragment removed
pub fn parse_seed(raw: &str) -> Result<Url, SeedError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| SeedError::Invalid {
        url: raw.to_string(),
        source,
    })?;
    url.set_fragment(None);

    // Validates scheme and host
    ScopePolicy::from_seed(&url)?;
    Ok(url)
}

// Checks whether an absolute URL may be crawled under `policy`
//
// Relative references must be resolved against their page first (the link
// extractor does that); anything that does not parse as an absolute URL is
// out of scope.
pub fn is_in_scope(candidate_url: &str, policy: &ScopePolicy) -> bool {
    match Url::parse(candidate_url) {
        Ok(url) => policy.allows(&url),
        Err(_) => false,
    }
}

// The identity of a URL: its serialized form without the fragment
pub fn normalize(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn canonical_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
