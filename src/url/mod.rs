//! URL canonicalization and scope decisions
//!
//! This module owns everything about URL handling:
//! - Resolving href candidates against the page they were found on,
//!   including overlap correction for non-rooted relative references
//! - Normalizing URLs for consistent frontier bookkeeping
//! - Deciding whether a resolved URL falls inside the crawl scope

mod resolve;
mod scope;

pub use resolve::{is_attachment_url, normalize, resolve};
pub use scope::ScopeRoot;
