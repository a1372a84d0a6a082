//! File edit orchestration.
//!
//! Splits every edit into two phases so host I/O never mixes with matching:
//!
//! - **read phase**: look the file up through a [`FileFinder`], snapshot its
//!   text, and compute the new content in memory. Any failure here leaves
//!   the file untouched.
//! - **commit phase**: hand the new content to a [`Committer`], which
//!   replaces the stored content in one step. A failed commit is reported
//!   as-is and is not retried.
//!
//! The orchestrator takes no locks. Two concurrent edits of the same file
//! must be serialized by the caller, or the second may patch a stale
//! snapshot.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::edit::{self, diff, lines::LineIndex, patch};
use crate::error::{EditError, EditResult};

/// Bytes inspected for NUL when deciding whether a file is binary.
const BINARY_CHECK_BYTES: usize = 8192;

/// A file as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Resolved location.
    pub path: PathBuf,
    /// Display name (usually the file name).
    pub name: String,
    pub is_directory: bool,
    /// Size in bytes as last reported by the host.
    pub size: u64,
}

/// Locates files and supplies their current text.
pub trait FileFinder {
    /// Resolve an agent-supplied path. `None` when nothing is there.
    fn find(&self, path: &str) -> Option<FileHandle>;

    /// Current full text of `file`.
    fn read_text(&self, file: &FileHandle) -> anyhow::Result<String>;

    /// Current raw content of `file`. Hosts that only hold text can keep
    /// the default.
    fn read_bytes(&self, file: &FileHandle) -> anyhow::Result<Vec<u8>> {
        self.read_text(file).map(String::into_bytes)
    }

    /// Entries of the directory `dir`, in any order.
    fn list(&self, dir: &FileHandle) -> anyhow::Result<Vec<FileHandle>> {
        anyhow::bail!("{} cannot be listed by this host", dir.path.display())
    }
}

/// Creates files and directories.
pub trait FileCreator {
    /// Create `path` as an empty file or a directory, parents included, and
    /// return its handle. An existing entry is left untouched.
    fn create(&self, path: &str, is_directory: bool) -> anyhow::Result<FileHandle>;
}

/// Replaces a file's stored content.
pub trait Committer {
    fn commit(&self, file: &FileHandle, new_text: &str) -> anyhow::Result<()>;
}

impl<F> Committer for F
where
    F: Fn(&FileHandle, &str) -> anyhow::Result<()>,
{
    fn commit(&self, file: &FileHandle, new_text: &str) -> anyhow::Result<()> {
        self(file, new_text)
    }
}

/// How the replacement was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum EditMode {
    /// One unique location.
    Single,
    /// Every occurrence.
    All,
    /// An explicit 1-based inclusive line range.
    Lines { start: usize, end: usize },
    /// A new file written in full.
    Create,
    /// An existing file replaced in full.
    Overwrite,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single occurrence"),
            Self::All => f.write_str("all occurrences"),
            Self::Lines { start, end } => write!(f, "lines {start}-{end}"),
            Self::Create => f.write_str("new file"),
            Self::Overwrite => f.write_str("full overwrite"),
        }
    }
}

/// Outcome of one orchestrated edit, phrased for an agent's tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub success: bool,
    /// The path as the caller supplied it.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<EditMode>,
    /// Failure reason; `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl OperationReport {
    fn failed(path: &str, err: &EditError) -> Self {
        Self {
            success: false,
            path: path.to_owned(),
            original_length: None,
            new_length: None,
            new_line_count: None,
            mode: None,
            error: Some(err.to_string()),
            diff: None,
        }
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.error {
            return write!(f, "Error: {reason}\npath: {}", self.path);
        }
        writeln!(f, "Updated {}", self.path)?;
        if let Some(len) = self.original_length {
            writeln!(f, "- original length: {len} chars")?;
        }
        if let Some(len) = self.new_length {
            writeln!(f, "- new length: {len} chars")?;
        }
        if let Some(lines) = self.new_line_count {
            writeln!(f, "- line count: {lines}")?;
        }
        if let Some(mode) = self.mode {
            writeln!(f, "- mode: {mode}")?;
        }
        if let Some(diff) = self.diff.as_deref().filter(|d| !d.is_empty()) {
            write!(f, "\n{diff}")?;
        }
        write!(f, "\nCheck the file for errors before continuing.")
    }
}

/// A computed edit, ready to commit.
struct Prepared {
    file: FileHandle,
    before: String,
    after: String,
}

/// Precondition checks shared by every entry point: the path must resolve
/// to a regular file.
fn locate(path: &str, finder: &impl FileFinder) -> EditResult<FileHandle> {
    let file = finder.find(path).ok_or_else(|| EditError::FileNotFound {
        path: path.to_owned(),
    })?;
    if file.is_directory {
        return Err(EditError::IsDirectory {
            path: path.to_owned(),
        });
    }
    Ok(file)
}

fn read_error(file: &FileHandle, e: &anyhow::Error) -> EditError {
    EditError::Read {
        path: file.path.display().to_string(),
        reason: format!("{e:#}"),
    }
}

fn snapshot(file: &FileHandle, finder: &impl FileFinder) -> EditResult<String> {
    finder.read_text(file).map_err(|e| read_error(file, &e))
}

fn create(path: &str, is_directory: bool, creator: &impl FileCreator) -> EditResult<FileHandle> {
    creator
        .create(path, is_directory)
        .map_err(|e| EditError::Create {
            path: path.to_owned(),
            reason: format!("{e:#}"),
        })
}

fn commit_phase(
    path: &str,
    prepared: Prepared,
    mode: EditMode,
    committer: &impl Committer,
) -> OperationReport {
    let Prepared { file, before, after } = prepared;

    if let Err(e) = committer.commit(&file, &after) {
        let err = EditError::Commit {
            path: file.path.display().to_string(),
            reason: format!("{e:#}"),
        };
        error!(path = %file.path.display(), error = %err, "commit failed");
        return OperationReport::failed(path, &err);
    }

    let (added, removed) = diff::line_changes(&before, &after);
    info!(path = %file.path.display(), %mode, added, removed, "file updated");
    OperationReport {
        success: true,
        path: path.to_owned(),
        original_length: Some(before.chars().count()),
        new_length: Some(after.chars().count()),
        new_line_count: Some(LineIndex::new(&after).len()),
        mode: Some(mode),
        error: None,
        diff: Some(diff::unified_diff(&file.name, &before, &after)),
    }
}

fn report_failure(path: &str, err: &EditError) -> OperationReport {
    if err.is_match_failure() {
        debug!(path, error = %err, "no usable match");
    } else {
        warn!(path, error = %err, "edit rejected");
    }
    OperationReport::failed(path, err)
}

/// Locate `old_string` in the file at `path` and replace it.
///
/// Rejects `old_string == new_string` before touching the host, then runs
/// the precondition checks, the read phase, and the commit phase.
pub fn edit_file_by_search(
    path: &str,
    old_string: &str,
    new_string: &str,
    replace_all: bool,
    finder: &impl FileFinder,
    committer: &impl Committer,
) -> OperationReport {
    if old_string == new_string {
        let err = EditError::Validation("old_string and new_string must be different".to_owned());
        return report_failure(path, &err);
    }

    let prepared = locate(path, finder).and_then(|file| {
        let before = snapshot(&file, finder)?;
        let after = edit::smart_replace(&before, old_string, new_string, replace_all)?;
        Ok(Prepared { file, before, after })
    });

    let mode = if replace_all { EditMode::All } else { EditMode::Single };
    match prepared {
        Ok(prepared) => commit_phase(path, prepared, mode, committer),
        Err(err) => report_failure(path, &err),
    }
}

/// Replace lines `start_line..=end_line` (1-based) of the file at `path`.
pub fn edit_file_by_lines(
    path: &str,
    start_line: usize,
    end_line: usize,
    new_text: &str,
    finder: &impl FileFinder,
    committer: &impl Committer,
) -> OperationReport {
    let prepared = locate(path, finder).and_then(|file| {
        let before = snapshot(&file, finder)?;
        let after = patch::replace_lines(&before, start_line, end_line, new_text)?;
        Ok(Prepared { file, before, after })
    });

    let mode = EditMode::Lines {
        start: start_line,
        end: end_line,
    };
    match prepared {
        Ok(prepared) => commit_phase(path, prepared, mode, committer),
        Err(err) => report_failure(path, &err),
    }
}

/// Replace the whole content of the file at `path` with `content`.
///
/// A missing file is created first, parent directories included. An
/// existing file must be readable as text so the report can show the diff.
pub fn write_file(
    path: &str,
    content: &str,
    finder: &impl FileFinder,
    creator: &impl FileCreator,
    committer: &impl Committer,
) -> OperationReport {
    let prepared = match finder.find(path) {
        Some(file) if file.is_directory => Err(EditError::IsDirectory {
            path: path.to_owned(),
        }),
        Some(file) => snapshot(&file, finder).map(|before| (file, before, EditMode::Overwrite)),
        None => create(path, false, creator).map(|file| (file, String::new(), EditMode::Create)),
    };

    match prepared {
        Ok((file, before, mode)) => {
            let prepared = Prepared {
                file,
                before,
                after: content.to_owned(),
            };
            commit_phase(path, prepared, mode, committer)
        }
        Err(err) => report_failure(path, &err),
    }
}

/// Create the directory `path` and any missing parents. An existing
/// directory is returned as is.
pub fn create_directory(
    path: &str,
    finder: &impl FileFinder,
    creator: &impl FileCreator,
) -> EditResult<FileHandle> {
    match finder.find(path) {
        Some(dir) if dir.is_directory => Ok(dir),
        Some(_) => Err(EditError::NotADirectory {
            path: path.to_owned(),
        }),
        None => {
            let dir = create(path, true, creator)?;
            info!(path = %dir.path.display(), "directory created");
            Ok(dir)
        }
    }
}

/// List the directory at `path`: subdirectories first, then files, each
/// group sorted by name.
pub fn list_directory(path: &str, finder: &impl FileFinder) -> EditResult<String> {
    let dir = finder.find(path).ok_or_else(|| EditError::FileNotFound {
        path: path.to_owned(),
    })?;
    if !dir.is_directory {
        return Err(EditError::NotADirectory {
            path: path.to_owned(),
        });
    }

    let mut entries = finder.list(&dir).map_err(|e| read_error(&dir, &e))?;
    if entries.is_empty() {
        return Ok(format!("Directory {path} is empty.\n"));
    }
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut out = format!("Directory {path} ({} entries)\n", entries.len());
    for entry in &entries {
        if entry.is_directory {
            out.push_str(&format!("{}/\n", entry.name));
        } else {
            out.push_str(&format!("{} ({} bytes)\n", entry.name, entry.size));
        }
    }
    Ok(out)
}

/// Read the file at `path` with each line prefixed `"<n> | "`.
///
/// `range` is a 1-based inclusive line range, clamped to the file. Files
/// over `max_bytes`, with NUL bytes near the start, or that are not UTF-8
/// are refused as binary.
pub fn read_file(
    path: &str,
    range: Option<(usize, usize)>,
    max_bytes: u64,
    finder: &impl FileFinder,
) -> EditResult<String> {
    let file = locate(path, finder)?;
    if file.size > max_bytes {
        return Err(EditError::FileTooLarge {
            path: path.to_owned(),
            size: file.size,
            limit: max_bytes,
        });
    }

    let bytes = finder.read_bytes(&file).map_err(|e| read_error(&file, &e))?;
    let binary = || EditError::BinaryFile {
        path: path.to_owned(),
    };
    if bytes[..bytes.len().min(BINARY_CHECK_BYTES)].contains(&0) {
        return Err(binary());
    }
    let text = String::from_utf8(bytes).map_err(|_| binary())?;

    let index = LineIndex::new(&text);
    let total = index.len();
    let (first, last) = match range {
        None => (0, total - 1),
        Some((start, end)) => {
            let first = start.saturating_sub(1);
            let last = end.saturating_sub(1).min(total - 1);
            if end == 0 || first > last {
                return Err(EditError::LineRange { start, end, total });
            }
            (first, last)
        }
    };

    let mut out = String::new();
    for i in first..=last {
        out.push_str(&format!("{} | {}\n", i + 1, index.line(i)));
    }
    Ok(out)
}
