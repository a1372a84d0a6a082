//! Unified diffs for edit reports, via the `similar` crate.

use similar::{Algorithm, ChangeTag, TextDiff};

/// Unified diff of `before` → `after`, headed `a/<label>` / `b/<label>`.
///
/// Patience keeps matching braces and blank lines anchored, which reads
/// better for source files than plain Myers.
pub fn unified_diff(label: &str, before: &str, after: &str) -> String {
    TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}

/// `(inserted, deleted)` line counts between `before` and `after`.
pub fn line_changes(before: &str, after: &str) -> (usize, usize) {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(before, after);
    diff.iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        })
}
