//! Crawl scope derivation and membership tests

use crate::{UrlError, UrlResult};
use url::Url;

/// The crawl boundary, derived once from the seed URL
///
/// A `ScopeRoot` captures scheme + host (+ port) + base-path prefix and is
/// immutable for the run. Every discovered page URL is tested against it;
/// attachments bypass the test entirely (they may legitimately live on a
/// different host, e.g. a content-delivery network).
#[derive(Debug, Clone)]
pub struct ScopeRoot {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
}

impl ScopeRoot {
    /// Derives the scope root from the seed URL
    ///
    /// The path prefix keeps no trailing slash, so `/docs/v1` and
    /// `/docs/v1/` define the same scope.
    pub fn new(seed: &Url) -> UrlResult<Self> {
        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(seed.scheme().to_string()));
        }

        let host = seed
            .host_str()
            .ok_or(UrlError::MissingHost)?
            .to_lowercase();

        Ok(Self {
            scheme: seed.scheme().to_string(),
            host,
            port: seed.port(),
            path: seed.path().trim_end_matches('/').to_string(),
        })
    }

    /// The base-path prefix of the scope (no trailing slash)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Tests whether a URL falls inside the crawl scope
    ///
    /// Requires identical scheme and host, and the candidate path must have
    /// the scope path as a true, segment-aligned prefix: `/docs/v1/sub` and
    /// `/docs/v1?q=x` are in scope of `/docs/v1`, `/docs/v1-extra` is not.
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != self.scheme {
            return false;
        }

        let same_host = url
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false);
        if !same_host || url.port() != self.port {
            return false;
        }

        let candidate = url.path();
        if !candidate.starts_with(&self.path) {
            return false;
        }

        // Segment alignment: the remainder must be empty or start a new
        // path segment, otherwise the prefix match is mid-segment
        let remaining = &candidate[self.path.len()..];
        remaining.is_empty() || remaining.starts_with('/')
    }
}
