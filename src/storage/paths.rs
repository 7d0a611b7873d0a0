//! Deterministic URL-to-filesystem path mapping
//!
//! `map_to_path` is a pure function of (URL, scope root, output root):
//! no counters, no hidden state, so repeated runs reproduce identical
//! paths and the resume check can rely on them.
//!
//! The mirror layout relative to the output root:
//!
//! | URL relative to scope          | File                          |
//! |--------------------------------|-------------------------------|
//! | (root, no query)               | `index.html`                  |
//! | `?topic=a-b`                   | `topic--a-b.html`             |
//! | `/sub/page`                    | `sub/page/index.html`         |
//! | `/sub/page?topic=a`            | `sub/page/topic--a.html`      |

use crate::url::ScopeRoot;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::Url;

/// Characters that are invalid in filenames on Windows or Unix
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Query-derived filename length cap (Windows MAX_PATH headroom)
const MAX_QUERY_FILENAME: usize = 200;

/// Maps a page URL to its mirror path under the output root
///
/// The directory structure mirrors the URL path relative to the scope
/// root; query parameters are folded into the filename via a reversible
/// substitution (`=` becomes `--`, `&` becomes `_`).
pub fn map_to_path(url: &Url, scope: &ScopeRoot, output_root: &Path) -> PathBuf {
    let base_path = scope.path();
    let url_path = url.path();

    let relative = if url_path.starts_with(base_path) {
        &url_path[base_path.len()..]
    } else {
        url_path
    };
    let relative = percent_decode_str(relative.trim_matches('/'))
        .decode_utf8_lossy()
        .into_owned();

    let query_part = url
        .query()
        .filter(|q| !q.is_empty())
        .map(sanitize_query)
        .unwrap_or_default();

    let (sub_dir, filename) = match (relative.is_empty(), query_part.is_empty()) {
        // Root page
        (true, true) => (String::new(), "index.html".to_string()),
        // Same path as the scope root, distinguished by query
        (true, false) => (String::new(), format!("{}.html", query_part)),
        // Subpath without query
        (false, true) => (relative, "index.html".to_string()),
        // Subpath with query
        (false, false) => (relative, format!("{}.html", query_part)),
    };

    let mut path = output_root.to_path_buf();
    for component in sub_dir.split('/') {
        let clean = sanitize_component(component);
        if !clean.is_empty() {
            path.push(clean);
        }
    }
    path.push(sanitize_filename(&filename));
    path
}

/// Maps an attachment URL to its mirror path under the output root
///
/// Uses only the decoded final path segment of the URL, with the `.pdf`
/// extension forced when missing.
pub fn attachment_path(url: &Url, output_root: &Path) -> PathBuf {
    let decoded = percent_decode_str(url.path())
        .decode_utf8_lossy()
        .into_owned();
    let basename = decoded
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download.pdf");

    let mut filename = sanitize_component(basename);
    if filename.is_empty() {
        filename = "download".to_string();
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        filename.push_str(".pdf");
    }
    output_root.join(filename)
}

/// Converts a URL query string into a filename-safe string
///
/// `topic=a-b&ref=nav` becomes `topic--a-b_ref--nav`. Remaining unsafe
/// characters are replaced and the result is length-capped.
fn sanitize_query(query: &str) -> String {
    let mut result: String = query
        .replace('=', "--")
        .replace('&', "_")
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if result.len() > MAX_QUERY_FILENAME {
        // Truncate on a char boundary
        let mut cut = MAX_QUERY_FILENAME;
        while !result.is_char_boundary(cut) {
            cut -= 1;
        }
        result.truncate(cut);
    }
    result
}

/// Removes or replaces characters that are invalid in filenames
///
/// Preserves a known extension; anything else gets `.html` appended so the
/// mirror never produces extension-less files.
fn sanitize_filename(filename: &str) -> String {
    let mut sanitized: String = filename
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    sanitized = sanitized.trim_matches(['.', ' ']).to_string();

    if sanitized.is_empty() {
        sanitized = "page.html".to_string();
    }

    let lower = sanitized.to_lowercase();
    if !lower.ends_with(".html") && !lower.ends_with(".pdf") {
        sanitized.push_str(".html");
    }
    sanitized
}

/// Sanitizes one directory component
///
/// Stripping leading and trailing dots keeps `..` from ever escaping the
/// output root.
fn sanitize_component(component: &str) -> String {
    component
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim_matches(['.', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(seed: &str) -> ScopeRoot {
        ScopeRoot::new(&Url::parse(seed).unwrap()).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_root_page_maps_to_index() {
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(&url("https://x.test/docs/v1"), &root, Path::new("out"));
        assert_eq!(path, PathBuf::from("out/index.html"));
    }

    #[test]
    fn test_query_folds_into_filename() {
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(
            &url("https://x.test/docs/v1?topic=application-design"),
            &root,
            Path::new("out"),
        );
        assert_eq!(path, PathBuf::from("out/topic--application-design.html"));
    }

    #[test]
    fn test_multi_param_query() {
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(
            &url("https://x.test/docs/v1?topic=a&ref=nav"),
            &root,
            Path::new("out"),
        );
        assert_eq!(path, PathBuf::from("out/topic--a_ref--nav.html"));
    }

    #[test]
    fn test_subpage_maps_to_subdirectory() {
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(&url("https://x.test/docs/v1/sub/page"), &root, Path::new("out"));
        assert_eq!(path, PathBuf::from("out/sub/page/index.html"));
    }

    #[test]
    fn test_subpage_with_query() {
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(
            &url("https://x.test/docs/v1/sub?topic=a"),
            &root,
            Path::new("out"),
        );
        assert_eq!(path, PathBuf::from("out/sub/topic--a.html"));
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let root = scope("https://x.test/docs/v1");
        let target = url("https://x.test/docs/v1/sub?topic=a&b=c");
        let first = map_to_path(&target, &root, Path::new("out"));
        let second = map_to_path(&target, &root, Path::new("out"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_percent_decoding_in_components() {
        let root = scope("https://x.test/docs");
        let path = map_to_path(&url("https://x.test/docs/a%20b/c"), &root, Path::new("out"));
        assert_eq!(path, PathBuf::from("out/a b/c/index.html"));
    }

    #[test]
    fn test_dot_components_cannot_escape() {
        let root = scope("https://x.test/");
        let mut target = url("https://x.test/");
        target.set_path("/%2e%2e/evil");
        let path = map_to_path(&target, &root, Path::new("out"));
        assert!(path.starts_with("out"));
        assert!(!path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir)));
    }

    #[test]
    fn test_invalid_chars_replaced() {
        let root = scope("https://x.test/docs");
        let path = map_to_path(
            &url("https://x.test/docs/page?q=a|b*c"),
            &root,
            Path::new("out"),
        );
        assert_eq!(path, PathBuf::from("out/page/q--a_b_c.html"));
    }

    #[test]
    fn test_long_query_capped() {
        let long = "k=".to_string() + &"v".repeat(500);
        let name = sanitize_query(&long);
        assert!(name.len() <= MAX_QUERY_FILENAME);
    }

    #[test]
    fn test_attachment_uses_final_segment() {
        let path = attachment_path(&url("https://cdn.test/files/guide.pdf"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/guide.pdf"));
    }

    #[test]
    fn test_attachment_forces_extension() {
        let path = attachment_path(&url("https://cdn.test/files/guide"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/guide.pdf"));
    }

    #[test]
    fn test_attachment_without_segment() {
        let path = attachment_path(&url("https://cdn.test/"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/download.pdf"));
    }

    #[test]
    fn test_attachment_decodes_filename() {
        let path = attachment_path(
            &url("https://cdn.test/files/user%20guide.pdf"),
            Path::new("out"),
        );
        assert_eq!(path, PathBuf::from("out/user guide.pdf"));
    }

    #[test]
    fn test_url_outside_scope_uses_full_path() {
        // A path that does not share the scope prefix mirrors its full
        // URL path instead
        let root = scope("https://x.test/docs/v1");
        let path = map_to_path(&url("https://x.test/other/page"), &root, Path::new("out"));
        assert_eq!(path, PathBuf::from("out/other/page/index.html"));
    }
}
