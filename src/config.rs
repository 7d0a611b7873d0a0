//! Run configuration for a mirror session
//!
//! All knobs arrive from the command line; this module owns the validated
//! form handed to the crawler.

use crate::{MirrorError, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Which link targets the crawler downloads and follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentPolicy {
    /// Only markup pages; attachment links are ignored
    Pages,
    /// Only attachments; page links are ignored
    Attachments,
    /// Both pages and attachments
    All,
}

impl ContentPolicy {
    /// True if the policy accepts attachment links
    pub fn wants_attachments(&self) -> bool {
        matches!(self, ContentPolicy::Attachments | ContentPolicy::All)
    }

    /// True if the policy accepts markup page links
    pub fn wants_pages(&self) -> bool {
        matches!(self, ContentPolicy::Pages | ContentPolicy::All)
    }
}

/// Configuration for a crawl session
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Starting URL; also defines the crawl scope
    pub start_url: String,

    /// Local folder where mirrored content is written
    pub output_root: PathBuf,

    /// Attribute name to filter seed-page containers on (e.g. "class",
    /// "id", "aria-label"); requires `filter_text`
    pub filter_attr: Option<String>,

    /// Text searched for in container attributes; without `filter_attr`
    /// every attribute is searched
    pub filter_text: Option<String>,

    /// Follow discovered links recursively
    pub recursive: bool,

    /// Pause between consecutive requests
    pub delay: Duration,

    /// Maximum number of resources to save (0 = unlimited)
    pub max_pages: usize,

    /// Per-attempt request timeout
    pub timeout: Duration,

    /// Skip targets whose artifact already exists on disk
    pub resume: bool,

    /// Which link kinds to download and follow
    pub content: ContentPolicy,

    /// Surface out-of-scope and skipped-content decisions in the log
    pub verbose: bool,
}

impl CrawlConfig {
    /// Validates the configuration before a run starts
    ///
    /// Checks that the start URL parses, uses http/https, and has a host.
    /// The output root is created later, on first write.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.start_url)
            .map_err(|e| MirrorError::Config(format!("Invalid start URL: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(MirrorError::Config(format!(
                "Start URL must be http or https, got: {}",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(MirrorError::Config(
                "Start URL has no host".to_string(),
            ));
        }

        if self.filter_attr.is_some() && self.filter_text.is_none() {
            return Err(MirrorError::Config(
                "A filter attribute requires filter text".to_string(),
            ));
        }

        Ok(())
    }
}
