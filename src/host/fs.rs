//! Local filesystem collaborators, bounded to a workspace root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::file_edit::{Committer, FileCreator, FileFinder, FileHandle};
use crate::util::atomic::atomic_write;

/// `<ctrl42>`-style tokens some model outputs leak into paths.
static CONTROL_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<ctrl\d+>").ok());

/// Clean an agent-supplied path: drop backticks, double quotes, control
/// tokens, a `file://` scheme, and surrounding whitespace; use `/`
/// separators.
pub fn sanitize_path(raw: &str) -> String {
    let cleaned = raw.replace(['`', '"'], "");
    let cleaned = match CONTROL_TOKEN.as_ref() {
        Some(token) => token.replace_all(&cleaned, "").into_owned(),
        None => cleaned,
    };
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_prefix("file://").unwrap_or(cleaned);
    cleaned.replace('\\', "/")
}

/// Finds, reads, and atomically rewrites files under one workspace root.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// The root is canonicalized when possible so symlinked roots compare
    /// correctly.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` to an existing location inside the root.
    ///
    /// Relative paths are joined to the root. Null bytes, missing files, and
    /// anything that canonicalizes outside the root resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let cleaned = sanitize_path(path);
        if cleaned.is_empty() || cleaned.contains('\0') {
            return None;
        }

        let joined = if Path::new(&cleaned).is_absolute() {
            PathBuf::from(&cleaned)
        } else {
            self.root.join(&cleaned)
        };

        let resolved = joined.canonicalize().ok()?;
        if !resolved.starts_with(&self.root) {
            warn!(path = %resolved.display(), root = %self.root.display(), "path escapes workspace");
            return None;
        }
        Some(resolved)
    }

    /// Resolve `path` to a location inside the root that may not exist yet.
    ///
    /// The deepest existing ancestor is canonicalized. The missing tail may
    /// only contain plain names, so `..` below a missing directory fails.
    pub fn resolve_new(&self, path: &str) -> Option<PathBuf> {
        let cleaned = sanitize_path(path);
        if cleaned.is_empty() || cleaned.contains('\0') {
            return None;
        }

        let joined = if Path::new(&cleaned).is_absolute() {
            PathBuf::from(&cleaned)
        } else {
            self.root.join(&cleaned)
        };

        let mut ancestor = joined.as_path();
        let mut tail = Vec::new();
        while !ancestor.exists() {
            tail.push(ancestor.file_name()?);
            ancestor = ancestor.parent()?;
        }

        let mut resolved = ancestor.canonicalize().ok()?;
        for name in tail.iter().rev() {
            resolved.push(name);
        }

        if !resolved.starts_with(&self.root) {
            warn!(path = %resolved.display(), root = %self.root.display(), "path escapes workspace");
            return None;
        }
        Some(resolved)
    }

    fn handle(path: PathBuf, meta: &std::fs::Metadata) -> FileHandle {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        FileHandle {
            path,
            name,
            is_directory: meta.is_dir(),
            size: meta.len(),
        }
    }
}

impl FileFinder for LocalFs {
    fn find(&self, path: &str) -> Option<FileHandle> {
        let resolved = self.resolve(path)?;
        let meta = std::fs::metadata(&resolved).ok()?;
        debug!(path = %resolved.display(), "resolved file");
        Some(Self::handle(resolved, &meta))
    }

    fn read_text(&self, file: &FileHandle) -> Result<String> {
        std::fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))
    }

    fn read_bytes(&self, file: &FileHandle) -> Result<Vec<u8>> {
        std::fs::read(&file.path).with_context(|| format!("failed to read {}", file.path.display()))
    }

    fn list(&self, dir: &FileHandle) -> Result<Vec<FileHandle>> {
        let entries = std::fs::read_dir(&dir.path)
            .with_context(|| format!("failed to list {}", dir.path.display()))?;
        let mut handles = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to list {}", dir.path.display()))?;
            let meta = entry
                .metadata()
                .with_context(|| format!("failed to stat {}", entry.path().display()))?;
            handles.push(Self::handle(entry.path(), &meta));
        }
        Ok(handles)
    }
}

impl FileCreator for LocalFs {
    fn create(&self, path: &str, is_directory: bool) -> Result<FileHandle> {
        let target = self
            .resolve_new(path)
            .ok_or_else(|| anyhow!("path is invalid or outside the workspace"))?;

        if is_directory {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("failed to create directory {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directories for {}", target.display()))?;
            }
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
        }

        let meta = std::fs::metadata(&target)
            .with_context(|| format!("failed to stat {}", target.display()))?;
        debug!(path = %target.display(), is_directory, "created");
        Ok(Self::handle(target, &meta))
    }
}

impl Committer for LocalFs {
    fn commit(&self, file: &FileHandle, new_text: &str) -> Result<()> {
        atomic_write(&file.path, new_text)
    }
}
