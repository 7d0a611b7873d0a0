//! Artifact writing and the resume existence check

use crate::{MirrorError, Result};
use std::fs;
use std::path::Path;

/// Writes markup content as UTF-8 text, creating directories as needed
pub fn save_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content).map_err(|source| MirrorError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Writes raw bytes (attachments), creating directories as needed
pub fn save_bytes(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content).map_err(|source| MirrorError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Checks whether an artifact already exists with content
///
/// Zero-length files do not count: an interrupted write must not suppress
/// a re-fetch on resume.
pub fn artifact_exists(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Reads a saved markup artifact back for resume-mode link extraction
pub fn read_artifact(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| MirrorError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    Ok(())
}
