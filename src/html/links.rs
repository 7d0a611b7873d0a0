//! Href extraction from scoped containers

use crate::config::ContentPolicy;
use scraper::{ElementRef, Selector};

/// Extracts href values from anchors inside the given containers
///
/// Walks every `a[href]` descendant of each container, deduplicates by
/// first occurrence, and keeps only the hrefs the content policy asks for.
/// Attachments are recognized by the `.pdf` extension on the href's path
/// portion. The returned hrefs may still be relative; resolution happens
/// at the frontier.
pub fn extract_hrefs(elements: &[ElementRef], policy: ContentPolicy) -> Vec<String> {
    let anchors = match Selector::parse("a[href]") {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    let mut hrefs = Vec::new();

    for element in elements {
        for anchor in element.select(&anchors) {
            let href = match anchor.value().attr("href") {
                Some(h) => h.trim(),
                None => continue,
            };
            if href.is_empty() || seen.contains(href) {
                continue;
            }

            let attachment = is_attachment_href(href);
            if attachment && !policy.wants_attachments() {
                continue;
            }
            if !attachment && !policy.wants_pages() {
                continue;
            }

            seen.insert(href.to_string());
            hrefs.push(href.to_string());
        }
    }

    hrefs
}

/// Checks the path portion of an href for an attachment extension
fn is_attachment_href(href: &str) -> bool {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or(href);
    path.to_lowercase().ends_with(".pdf")
}
