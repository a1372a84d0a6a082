//! Atomic file replacement via tempfile + rename.
//!
//! The new content goes to a [`tempfile::NamedTempFile`] next to the target
//! and is then renamed over it, so a crash mid-write never leaves a
//! half-written file behind. When the target already exists its permission
//! bits are carried over to the replacement.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Atomically replace the content of `path` with `content`.
///
/// # Errors
///
/// Fails if the temp file cannot be created or written, or if the final
/// rename fails (for example across devices).
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;

    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .with_context(|| format!("failed to copy permissions of {}", path.display()))?;
    }

    tmp.write_all(content.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync temp file for {}", path.display()))?;

    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(())
}
