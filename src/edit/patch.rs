//! Patch application: pure string splicing.
//!
//! Bytes outside the replaced span are copied through untouched, including
//! line endings.

use crate::edit::lines::LineIndex;
use crate::edit::resolver::Match;
use crate::error::{EditError, EditResult};

/// Replace `document[start..end]` with `replacement`.
pub fn splice(document: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(document.len() - (end - start) + replacement.len());
    out.push_str(&document[..start]);
    out.push_str(replacement);
    out.push_str(&document[end..]);
    out
}

/// Replace the single resolved match.
pub fn apply(document: &str, found: &Match<'_>, replacement: &str) -> String {
    splice(document, found.start, found.end, replacement)
}

/// Replace every literal occurrence of `text`.
pub fn apply_all(document: &str, text: &str, replacement: &str) -> String {
    document.replace(text, replacement)
}

/// Replace lines `start_line..=end_line` (1-based) with `replacement`.
///
/// The line break after `end_line` is kept. An empty document only accepts
/// `start_line == 1`, in which case `replacement` becomes the whole document.
pub fn replace_lines(
    document: &str,
    start_line: usize,
    end_line: usize,
    replacement: &str,
) -> EditResult<String> {
    if document.is_empty() {
        return if start_line == 1 {
            Ok(replacement.to_owned())
        } else {
            Err(EditError::LineRange {
                start: start_line,
                end: end_line,
                total: 0,
            })
        };
    }

    let index = LineIndex::new(document);
    let total = index.len();
    if start_line == 0 || start_line > end_line || end_line > total {
        return Err(EditError::LineRange {
            start: start_line,
            end: end_line,
            total,
        });
    }

    let start = index.start_of(start_line - 1);
    let end = index.end_of(end_line - 1);
    Ok(splice(document, start, end, replacement))
}
