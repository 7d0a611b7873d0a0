//! Local mirror storage
//!
//! Maps URLs to deterministic filesystem paths and writes the fetched
//! content there, creating directories on demand.

mod paths;
mod saver;

pub use paths::{attachment_path, map_to_path};
pub use saver::{artifact_exists, read_artifact, save_bytes, save_text};
