//! Sitemirror: a bounded recursive website mirrorer
//!
//! This crate implements a crawler that starts from one URL, discovers
//! same-site links, and mirrors matched content to local storage exactly
//! once per logical resource, including across restarts.

pub mod config;
pub mod crawler;
pub mod html;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for sitemirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for sitemirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ContentPolicy, CrawlConfig};
pub use crawler::{CrawlReport, Crawler};
pub use url::{resolve, ScopeRoot};
