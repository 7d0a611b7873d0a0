//! Container filtering by div attributes
//!
//! Two filtering modes:
//!
//! 1. **Text only**: every attribute of every `<div>` is searched; any
//!    attribute value containing the text (case-insensitive) makes the div
//!    a match.
//! 2. **Attribute name + text**: only the named attribute is searched.
//!
//! Without filter text the whole document is the single searchable scope.
//! A configured filter that matches nothing also falls back to the whole
//! document, with a diagnostic: link extraction must never run against an
//! empty scope.

use scraper::{ElementRef, Html, Selector};

/// Narrows a document to the link-extraction scope
///
/// Returns the matching `<div>` containers, or the document root when no
/// filter is configured or nothing matched.
pub fn scope_elements<'a>(
    document: &'a Html,
    attr_name: Option<&str>,
    attr_text: Option<&str>,
) -> Vec<ElementRef<'a>> {
    let text = match attr_text {
        Some(t) if !t.is_empty() => t,
        _ => return vec![document.root_element()],
    };

    let divs = match Selector::parse("div") {
        Ok(sel) => sel,
        Err(_) => return vec![document.root_element()],
    };

    let needle = text.to_lowercase();
    let matches: Vec<ElementRef<'a>> = document
        .select(&divs)
        .filter(|div| match attr_name {
            Some(name) => attribute_matches(div, name, &needle),
            None => any_attribute_matches(div, &needle),
        })
        .collect();

    if matches.is_empty() {
        tracing::warn!(
            "No matching divs for text '{}'{}; falling back to full document",
            text,
            attr_name
                .map(|n| format!(" in attribute '{}'", n))
                .unwrap_or_default()
        );
        return vec![document.root_element()];
    }

    tracing::debug!("Found {} matching container(s)", matches.len());
    matches
}

/// Checks whether a specific attribute of the div contains the needle
///
/// The `class` attribute is multi-valued: any single token containing the
/// needle is a match. Other attributes match on a plain substring.
fn attribute_matches(div: &ElementRef, attr_name: &str, needle: &str) -> bool {
    let value = match div.value().attr(attr_name) {
        Some(v) => v,
        None => return false,
    };

    if attr_name.eq_ignore_ascii_case("class") {
        value
            .split_whitespace()
            .any(|token| token.to_lowercase().contains(needle))
    } else {
        value.to_lowercase().contains(needle)
    }
}

/// Checks whether any attribute of the div contains the needle
fn any_attribute_matches(div: &ElementRef, needle: &str) -> bool {
    div.value()
        .attrs()
        .any(|(_, value)| value.to_lowercase().contains(needle))
}
