//! Error types for the smart-edit crate.

/// Every way an edit, read, or tool call can fail.
///
/// The matching failures (`Validation`, `NotFound`, `Ambiguous`) carry the
/// guidance an agent needs to retry with a better request.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Caller-supplied inputs are nonsensical.
    #[error("{0}")]
    Validation(String),

    /// No strategy could locate the target text.
    #[error(
        "old_string was not found in the content. Re-read the file and supply the exact \
         current text to replace"
    )]
    NotFound,

    /// The target matched more than one location.
    #[error(
        "found {count} matches for old_string ({strategy}). Provide more surrounding context \
         to pin down a single location, or set replaceAll to change every occurrence"
    )]
    Ambiguous { strategy: &'static str, count: usize },

    /// The path does not resolve to any file.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The path resolves to a directory.
    #[error("path is a directory, not a file: {path}")]
    IsDirectory { path: String },

    /// The path resolves to a file where a directory is required.
    #[error("path is not a directory: {path}")]
    NotADirectory { path: String },

    /// Requested line range lies outside the document.
    #[error("line range {start}-{end} is out of bounds (document has {total} lines)")]
    LineRange {
        start: usize,
        end: usize,
        total: usize,
    },

    /// File exceeds the configured read limit.
    #[error("file too large: {path} ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    /// File is binary and cannot be treated as text.
    #[error("binary file cannot be edited: {path}")]
    BinaryFile { path: String },

    /// The host could not supply the file's current content.
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    /// The host could not create the file or directory.
    #[error("failed to create {path}: {reason}")]
    Create { path: String, reason: String },

    /// The host rejected or failed the commit; the file is unchanged.
    #[error("failed to write {path}: {reason}")]
    Commit { path: String, reason: String },
}

impl EditError {
    /// True for the failures produced by the matching engine itself, as
    /// opposed to host or precondition failures.
    pub const fn is_match_failure(&self) -> bool {
        matches!(self, Self::NotFound | Self::Ambiguous { .. })
    }
}

/// Convenience result type for smart-edit operations.
pub type EditResult<T> = Result<T, EditError>;
