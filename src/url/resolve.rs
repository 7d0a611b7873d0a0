//! Smart URL resolution with overlap correction
//!
//! Resolution follows standard base-join rules, with one extra pass: sites
//! sometimes emit relative hrefs that repeat the tail of the page path
//! (base `/docs/en/db2/12.1.x`, href `docs/en/db2/12.1.x?topic=foo`).
//! A plain join would duplicate the shared segments; `fix_overlap` splices
//! the reference onto the base path exactly once instead.

use url::Url;

/// Schemes that can never be crawled
const SKIP_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a potentially relative href against the page it was found on
///
/// Handles absolute URLs, absolute paths from the site root, relative
/// paths, protocol-relative references, and the overlap edge case where
/// the href path repeats the tail of the base path.
///
/// Returns `None` for empty, fragment-only, or non-navigable references
/// (`javascript:`, `mailto:`, `tel:`, `data:`) and for anything that does
/// not resolve to an http(s) URL.
pub fn resolve(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if SKIP_SCHEMES.iter().any(|s| href.starts_with(s)) {
        return None;
    }

    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        let url = Url::parse(href).ok()?;
        return Some(normalize(url));
    }

    // Standard base-join handles rooted paths, relative paths, and
    // protocol-relative references
    let joined = page_url.join(href).ok()?;

    if joined.scheme() != "http" && joined.scheme() != "https" {
        return None;
    }

    let fixed = fix_overlap(page_url, href, joined);
    Some(normalize(fixed))
}

/// Detects and corrects path overlap between the base URL and the href
///
/// Only applies to non-rooted, non-absolute references. Finds the longest
/// suffix of the base path equal to a prefix of the href path; on a match
/// the href remainder is spliced onto the full base path, keeping the
/// href's query string.
fn fix_overlap(page_url: &Url, href: &str, joined: Url) -> Url {
    if href.starts_with('/') || href.starts_with("http://") || href.starts_with("https://") {
        return joined;
    }

    let base_path = page_url.path().trim_end_matches('/');

    // Path portion of the href, without query or fragment
    let href_path = href
        .split('?')
        .next()
        .and_then(|p| p.split('#').next())
        .unwrap_or("");
    let href_query = href.split('#').next().and_then(|h| {
        let mut parts = h.splitn(2, '?');
        parts.next();
        parts.next()
    });

    let base_segments: Vec<&str> = base_path.split('/').collect();
    let href_segments: Vec<&str> = href_path.split('/').collect();

    // Longest overlap wins: check whether the last i segments of the base
    // equal the first i segments of the href
    let max_overlap = (base_segments.len().saturating_sub(1)).min(href_segments.len());
    for i in (1..=max_overlap).rev() {
        let base_tail = &base_segments[base_segments.len() - i..];
        let href_head = &href_segments[..i];
        if base_tail == href_head && !base_tail.iter().all(|s| s.is_empty()) {
            let remainder = href_segments[i..].join("/");
            let mut correct_path = if remainder.is_empty() {
                base_path.to_string()
            } else {
                format!("{}/{}", base_path, remainder)
            };
            correct_path = correct_path.trim_end_matches('/').to_string();
            if correct_path.is_empty() {
                correct_path = "/".to_string();
            }

            let mut corrected = page_url.clone();
            corrected.set_path(&correct_path);
            corrected.set_query(href_query.filter(|q| !q.is_empty()).or(joined.query()));
            corrected.set_fragment(None);
            return corrected;
        }
    }

    joined
}

/// Normalizes a URL for consistent frontier comparison
///
/// Strips the fragment and collapses duplicate path separators. The query
/// string is preserved verbatim and unsorted: distinct query strings are
/// distinct resources.
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);

    let path = url.path();
    if path.contains("//") {
        let mut collapsed = path.to_string();
        while collapsed.contains("//") {
            collapsed = collapsed.replace("//", "/");
        }
        url.set_path(&collapsed);
    }

    url
}

/// Checks whether a URL points at an attachment (by filename extension)
pub fn is_attachment_url(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let resolved = resolve(&page("https://example.com/a"), "https://other.com/b").unwrap();
        assert_eq!(resolved.as_str(), "https://other.com/b");
    }

    #[test]
    fn test_rooted_path() {
        let resolved = resolve(&page("https://example.com/a/b"), "/c/d").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/c/d");
    }

    #[test]
    fn test_relative_path() {
        let resolved = resolve(&page("https://example.com/a/b/c"), "d/e").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/a/b/d/e");
    }

    #[test]
    fn test_protocol_relative() {
        let resolved = resolve(&page("https://example.com/a"), "//cdn.example.com/x").unwrap();
        assert_eq!(resolved.as_str(), "https://cdn.example.com/x");
    }

    #[test]
    fn test_rejects_empty_and_fragment() {
        let base = page("https://example.com/a");
        assert!(resolve(&base, "").is_none());
        assert!(resolve(&base, "   ").is_none());
        assert!(resolve(&base, "#section").is_none());
    }

    #[test]
    fn test_rejects_non_navigable_schemes() {
        let base = page("https://example.com/a");
        assert!(resolve(&base, "javascript:void(0)").is_none());
        assert!(resolve(&base, "mailto:me@example.com").is_none());
        assert!(resolve(&base, "tel:+123456").is_none());
        assert!(resolve(&base, "data:text/html,<h1>x</h1>").is_none());
    }

    #[test]
    fn test_overlap_full_path_with_query() {
        // The href repeats the whole base path; only the query differs
        let base = page("https://www.ibm.com/docs/en/db2/12.1.x");
        let resolved = resolve(&base, "docs/en/db2/12.1.x?topic=application-design").unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://www.ibm.com/docs/en/db2/12.1.x?topic=application-design"
        );
    }

    #[test]
    fn test_overlap_partial_tail() {
        // Last base segment matches the first href segment
        let base = page("https://example.com/docs/v1");
        let resolved = resolve(&base, "v1/sub").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/docs/v1/sub");
    }

    #[test]
    fn test_overlap_never_duplicates_segment() {
        let base = page("https://x.test/docs/v1");
        let resolved = resolve(&base, "docs/v1/sub").unwrap();
        assert_eq!(resolved.as_str(), "https://x.test/docs/v1/sub");
        assert!(!resolved.path().contains("/v1/docs/"));
    }

    #[test]
    fn test_no_overlap_stays_standard() {
        // Plain relative resolution when nothing overlaps
        let base = page("https://example.com/a/b/page");
        let resolved = resolve(&base, "other").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/a/b/other");
    }

    #[test]
    fn test_rooted_href_skips_overlap_correction() {
        let base = page("https://example.com/docs/v1");
        let resolved = resolve(&base, "/docs/v1?topic=a").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/docs/v1?topic=a");
    }

    #[test]
    fn test_normalize_strips_fragment() {
        let url = normalize(Url::parse("https://example.com/a#frag").unwrap());
        assert_eq!(url.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_normalize_collapses_duplicate_slashes() {
        let url = normalize(Url::parse("https://example.com/a//b///c").unwrap());
        assert_eq!(url.path(), "/a/b/c");
    }

    #[test]
    fn test_normalize_keeps_query_order() {
        let url = normalize(Url::parse("https://example.com/a?b=2&a=1").unwrap());
        assert_eq!(url.as_str(), "https://example.com/a?b=2&a=1");
    }

    #[test]
    fn test_attachment_detection() {
        assert!(is_attachment_url(&page("https://cdn.test/guide.pdf")));
        assert!(is_attachment_url(&page("https://cdn.test/GUIDE.PDF")));
        assert!(!is_attachment_url(&page("https://cdn.test/guide.html")));
        // Query does not make a page an attachment
        assert!(!is_attachment_url(&page("https://x.test/view?file=a.pdf")));
    }
}
