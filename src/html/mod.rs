//! Attribute-scoped link extraction
//!
//! A parsed document is first narrowed to the containers that match the
//! configured attribute filter (or left whole when no filter is set), then
//! candidate hrefs are pulled from the anchors inside those containers and
//! partitioned by content policy.

mod filter;
mod links;

pub use filter::scope_elements;
pub use links::extract_hrefs;
