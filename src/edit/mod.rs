//! Fuzzy locate-and-patch engine.
//!
//! Given a document, a target snippet the caller believes is in it, and a
//! replacement, find the one region the target refers to and splice the
//! replacement in. The target does not have to be byte-identical: the
//! strategy pipeline tolerates re-indentation, trailing whitespace, escaped
//! characters, and partially stale context.
//!
//! # Pipeline
//!
//! 1. `exact` - verbatim substring
//! 2. `line-trimmed` - per-line trim
//! 3. `block-anchor` - first/last line anchors + Levenshtein interior score
//! 4. `whitespace-normalized` - collapsed whitespace runs
//! 5. `indentation-flexible` - common indentation removed
//! 6. `escape-normalized` - `\n`, `\t`, `\"`, ... resolved
//! 7. `trimmed-boundary` - target stripped of surrounding whitespace
//! 8. `context-aware` - anchors + half of the interior matching exactly
//! 9. `multi-occurrence` - every literal occurrence, to report ambiguity
//!
//! The first strategy whose candidates occur in the document decides the
//! outcome; see [`resolver`].
//!
//! Nothing here performs I/O. File access lives in [`crate::file_edit`].

pub mod diff;
pub mod levenshtein;
pub mod lines;
pub mod patch;
pub mod resolver;
pub mod strategies;

use tracing::debug;

use crate::error::{EditError, EditResult};
use resolver::Resolution;

/// Replace the region of `content` that `old` refers to with `new`.
///
/// With `replace_all`, the first candidate of the first productive strategy
/// is replaced at every literal occurrence and uniqueness is not enforced.
///
/// # Errors
///
/// - [`EditError::Validation`] when `old == new`, or when `old` is empty and
///   `content` is not
/// - [`EditError::NotFound`] when no strategy locates `old`
/// - [`EditError::Ambiguous`] when the located text occurs more than once
///   and `replace_all` is false
pub fn smart_replace(content: &str, old: &str, new: &str, replace_all: bool) -> EditResult<String> {
    if old == new {
        return Err(EditError::Validation(
            "old_string and new_string must be different".to_owned(),
        ));
    }
    // An empty target matches between every character.
    if old.is_empty() && !content.is_empty() {
        return Err(EditError::Validation(
            "old_string cannot be empty for a non-empty file. Provide the text to find and \
             replace, or use the write tool to replace the whole file"
                .to_owned(),
        ));
    }

    match resolver::resolve(content, old, replace_all) {
        Resolution::Unique(found) => Ok(patch::apply(content, &found, new)),
        Resolution::All(found) => {
            debug!(strategy = found.strategy, "replacing every occurrence");
            Ok(patch::apply_all(content, &found.text, new))
        }
        Resolution::Ambiguous { strategy, count } => {
            Err(EditError::Ambiguous { strategy, count })
        }
        Resolution::NotFound => Err(EditError::NotFound),
    }
}
