//! Matching strategies, strictest first.
//!
//! Every strategy takes `(content, target)` and lazily yields candidate
//! strings: text that literally occurs in `content` and that the strategy
//! believes is what `target` refers to. Strategies never decide uniqueness;
//! that is the resolver's job.
//!
//! Strategies are plain functions over borrowed input, so they can be
//! re-run freely and shared across threads.

use std::borrow::Cow;
use std::iter;

use regex::Regex;

use crate::edit::levenshtein::similarity;
use crate::edit::lines::{target_lines, LineIndex};

/// Accept a lone block-anchor candidate at any interior similarity.
pub const SINGLE_CANDIDATE_SIMILARITY_THRESHOLD: f64 = 0.0;

/// Minimum interior similarity for the best of several block-anchor
/// candidates.
pub const MULTIPLE_CANDIDATES_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Minimum share of matching non-blank interior lines for a context-aware
/// match.
pub const CONTEXT_MATCH_RATIO: f64 = 0.5;

/// Lazy sequence of candidates yielded by one strategy.
pub type Candidates<'a> = Box<dyn Iterator<Item = Cow<'a, str>> + 'a>;

/// Signature shared by every strategy.
pub type StrategyFn = for<'a> fn(&'a str, &'a str) -> Candidates<'a>;

/// A named entry in the pipeline.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub find: StrategyFn,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Strategy").field(&self.name).finish()
    }
}

/// The fixed priority order the resolver walks.
pub const PIPELINE: &[Strategy] = &[
    Strategy { name: "exact", find: exact },
    Strategy { name: "line-trimmed", find: line_trimmed },
    Strategy { name: "block-anchor", find: block_anchor },
    Strategy { name: "whitespace-normalized", find: whitespace_normalized },
    Strategy { name: "indentation-flexible", find: indentation_flexible },
    Strategy { name: "escape-normalized", find: escape_normalized },
    Strategy { name: "trimmed-boundary", find: trimmed_boundary },
    Strategy { name: "context-aware", find: context_aware },
    Strategy { name: "multi-occurrence", find: multi_occurrence },
];

fn nothing<'a>() -> Candidates<'a> {
    Box::new(iter::empty())
}

// ---------------------------------------------------------------------------
// Exact
// ---------------------------------------------------------------------------

/// The target occurs verbatim.
pub fn exact<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    if content.contains(find) {
        Box::new(iter::once(Cow::Borrowed(find)))
    } else {
        nothing()
    }
}

// ---------------------------------------------------------------------------
// Line-trimmed
// ---------------------------------------------------------------------------

/// Every line of a window equals the matching target line once both are
/// trimmed. Yields the window with its original whitespace.
pub fn line_trimmed<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    let index = LineIndex::new(content);
    let wanted: Vec<&str> = target_lines(find).into_iter().map(str::trim).collect();
    let count = wanted.len();

    Box::new(index.window_starts(count).filter_map(move |i| {
        let hit = wanted
            .iter()
            .enumerate()
            .all(|(j, line)| index.line(i + j).trim() == *line);
        hit.then(|| Cow::Borrowed(index.window(i, count)))
    }))
}

// ---------------------------------------------------------------------------
// Block-anchor
// ---------------------------------------------------------------------------

/// Anchors on the trimmed first and last target lines and scores the lines
/// in between by edit-distance similarity.
///
/// A block runs from a line equal to the first anchor to the nearest line at
/// least two lines below it that equals the last anchor, so its length may
/// differ from the target's.
pub fn block_anchor<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    if too_short_for_anchors(find) {
        return nothing();
    }
    let wanted = target_lines(find);

    let index = LineIndex::new(content);
    let first = wanted[0].trim();
    let last = wanted[wanted.len() - 1].trim();
    let blocks = anchored_blocks(&index, first, last);

    let chosen = match blocks.as_slice() {
        [] => None,
        [(start, end)] => {
            let score = interior_similarity(&index, *start, *end, &wanted);
            (score >= SINGLE_CANDIDATE_SIMILARITY_THRESHOLD).then_some((*start, *end))
        }
        _ => {
            let mut best: Option<((usize, usize), f64)> = None;
            for &(start, end) in &blocks {
                let score = interior_similarity(&index, start, end, &wanted);
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some(((start, end), score));
                }
            }
            best.filter(|(_, score)| *score >= MULTIPLE_CANDIDATES_SIMILARITY_THRESHOLD)
                .map(|(block, _)| block)
        }
    };

    match chosen {
        Some((start, end)) => Box::new(iter::once(Cow::Borrowed(index.span(start, end)))),
        None => nothing(),
    }
}

/// Anchored strategies need three raw lines. A trailing newline counts, so
/// `"a\nb\n"` qualifies and anchors on `a` and `b`.
fn too_short_for_anchors(find: &str) -> bool {
    find.split('\n').count() < 3
}

/// `(first_line, last_line)` of every anchored block, at most one per
/// first-anchor line.
fn anchored_blocks(index: &LineIndex<'_>, first: &str, last: &str) -> Vec<(usize, usize)> {
    (0..index.len())
        .filter(|&i| index.line(i).trim() == first)
        .filter_map(|i| {
            ((i + 2)..index.len())
                .find(|&j| index.line(j).trim() == last)
                .map(|j| (i, j))
        })
        .collect()
}

/// Mean similarity of the interior lines, paired top-down. Blocks with no
/// comparable interior score 1.0.
#[allow(clippy::cast_precision_loss)]
fn interior_similarity(index: &LineIndex<'_>, start: usize, end: usize, wanted: &[&str]) -> f64 {
    let block_len = end - start + 1;
    let to_check = (wanted.len() - 2).min(block_len - 2);
    if to_check == 0 {
        return 1.0;
    }
    let total: f64 = (1..=to_check)
        .map(|k| similarity(index.line(start + k).trim(), wanted[k].trim()))
        .sum();
    total / to_check as f64
}

// ---------------------------------------------------------------------------
// Whitespace-normalized
// ---------------------------------------------------------------------------

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Runs of whitespace collapse to one space. Compares single lines (also
/// finding the target inside a longer line) and multi-line windows.
pub fn whitespace_normalized<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    let wanted = collapse_whitespace(find);
    if wanted.is_empty() {
        return nothing();
    }

    let index = LineIndex::new(content);
    let window_len = find.split('\n').count();
    let flexible = whitespace_flexible_regex(find);

    let singles = index.lines().to_vec().into_iter().filter_map({
        let wanted = wanted.clone();
        move |line| {
            let normalized = collapse_whitespace(line);
            if normalized == wanted {
                Some(Cow::Borrowed(line))
            } else if normalized.contains(&wanted) {
                flexible
                    .as_ref()
                    .and_then(|re| re.find(line))
                    .map(|m| Cow::Borrowed(m.as_str()))
            } else {
                None
            }
        }
    });

    let windows: Candidates<'a> = if window_len > 1 {
        Box::new(index.window_starts(window_len).filter_map(move |i| {
            let block = index.window(i, window_len);
            (collapse_whitespace(block) == wanted).then_some(Cow::Borrowed(block))
        }))
    } else {
        nothing()
    };

    Box::new(singles.chain(windows))
}

/// `word\s+word\s+...` over the target's words, for locating the target
/// inside a longer line.
fn whitespace_flexible_regex(find: &str) -> Option<Regex> {
    let words: Vec<String> = find.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    Regex::new(&words.join(r"\s+")).ok()
}

// ---------------------------------------------------------------------------
// Indentation-flexible
// ---------------------------------------------------------------------------

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn drop_chars(line: &str, n: usize) -> &str {
    line.char_indices().nth(n).map_or("", |(at, _)| &line[at..])
}

/// Strip the smallest indentation shared by the non-blank lines.
fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(indent) = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
    else {
        return text.to_owned();
    };

    lines
        .iter()
        .map(|&line| {
            if line.trim().is_empty() {
                line
            } else {
                drop_chars(line, indent)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Windows equal to the target once both lose their common indentation.
pub fn indentation_flexible<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    let wanted = dedent(find);
    let window_len = find.split('\n').count();
    let index = LineIndex::new(content);

    Box::new(index.window_starts(window_len).filter_map(move |i| {
        let block = index.window(i, window_len);
        (dedent(block) == wanted).then_some(Cow::Borrowed(block))
    }))
}

// ---------------------------------------------------------------------------
// Escape-normalized
// ---------------------------------------------------------------------------

/// Resolve `\n \t \r \' \" \` \\ \$`; any other backslash stays literal.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let resolved = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some(&c) if matches!(c, '\'' | '"' | '`' | '\\' | '$') => c,
            _ => {
                out.push(ch);
                continue;
            }
        };
        chars.next();
        out.push(resolved);
    }

    out
}

/// The target with escape sequences resolved, either contained directly or
/// equal to an unescaped document window.
pub fn escape_normalized<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    let wanted = unescape(find);
    let window_len = wanted.split('\n').count();
    let direct = content
        .contains(wanted.as_str())
        .then(|| Cow::Owned(wanted.clone()));
    let index = LineIndex::new(content);

    let windows = index.window_starts(window_len).filter_map(move |i| {
        let block = index.window(i, window_len);
        (unescape(block) == wanted).then_some(Cow::Borrowed(block))
    });

    Box::new(direct.into_iter().chain(windows))
}

// ---------------------------------------------------------------------------
// Trimmed-boundary
// ---------------------------------------------------------------------------

/// The target without its surrounding whitespace. Inert when the target has
/// none.
pub fn trimmed_boundary<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    let trimmed = find.trim();
    if trimmed == find || trimmed.is_empty() {
        return nothing();
    }

    let direct = content.contains(trimmed).then_some(Cow::Borrowed(trimmed));
    let window_len = find.split('\n').count();
    let index = LineIndex::new(content);

    let windows = index.window_starts(window_len).filter_map(move |i| {
        let block = index.window(i, window_len);
        (block.trim() == trimmed).then_some(Cow::Borrowed(block))
    });

    Box::new(direct.into_iter().chain(windows))
}

// ---------------------------------------------------------------------------
// Context-aware
// ---------------------------------------------------------------------------

/// Same anchors as block-anchor, but the block must be exactly as long as
/// the target and at least half of its non-blank interior lines must match
/// exactly after trimming.
#[allow(clippy::cast_precision_loss)]
pub fn context_aware<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    if too_short_for_anchors(find) {
        return nothing();
    }
    let wanted: Vec<&str> = target_lines(find).into_iter().map(str::trim).collect();

    let index = LineIndex::new(content);

    Box::new((0..index.len()).filter_map(move |i| {
        let first = wanted[0];
        let last = wanted[wanted.len() - 1];
        if index.line(i).trim() != first {
            return None;
        }
        let end = ((i + 2)..index.len()).find(|&j| index.line(j).trim() == last)?;
        if end - i + 1 != wanted.len() {
            return None;
        }

        let (mut compared, mut matched) = (0usize, 0usize);
        for k in 1..wanted.len() - 1 {
            let line = index.line(i + k).trim();
            if line.is_empty() && wanted[k].is_empty() {
                continue;
            }
            compared += 1;
            if line == wanted[k] {
                matched += 1;
            }
        }

        let accepted = compared == 0 || matched as f64 / compared as f64 >= CONTEXT_MATCH_RATIO;
        accepted.then(|| Cow::Borrowed(index.span(i, end)))
    }))
}

// ---------------------------------------------------------------------------
// Multi-occurrence
// ---------------------------------------------------------------------------

/// Every literal occurrence of the target, so a target present several
/// times surfaces as an ambiguity rather than a miss.
pub fn multi_occurrence<'a>(content: &'a str, find: &'a str) -> Candidates<'a> {
    if find.is_empty() {
        return nothing();
    }
    Box::new(content.match_indices(find).map(|(_, hit)| Cow::Borrowed(hit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(candidates: Candidates<'_>) -> Vec<String> {
        candidates.map(Cow::into_owned).collect()
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "exact",
                "line-trimmed",
                "block-anchor",
                "whitespace-normalized",
                "indentation-flexible",
                "escape-normalized",
                "trimmed-boundary",
                "context-aware",
                "multi-occurrence",
            ]
        );
    }

    #[test]
    fn test_exact() {
        assert_eq!(collect(exact("hello world", "world")), vec!["world"]);
        assert!(collect(exact("hello world", "planet")).is_empty());
    }

    #[test]
    fn test_line_trimmed_whitespace_diff() {
        let content = "  function foo() {\n    return 1;\n  }";
        let find = "function foo() {\n  return 1;\n}";
        assert_eq!(collect(line_trimmed(content, find)), vec![content]);
    }

    #[test]
    fn test_line_trimmed_no_match() {
        let content = "function foo() {\n  return 1;\n}";
        let find = "function bar() {\n  return 2;\n}";
        assert!(collect(line_trimmed(content, find)).is_empty());
    }

    #[test]
    fn test_line_trimmed_drops_trailing_newline() {
        let candidates = collect(line_trimmed("line1\nline2\nline3", "line1\nline2\n"));
        assert_eq!(candidates, vec!["line1\nline2"]);
    }

    #[test]
    fn test_line_trimmed_target_longer_than_content() {
        assert!(collect(line_trimmed("one", "one\ntwo\nthree")).is_empty());
    }

    #[test]
    fn test_line_trimmed_keeps_crlf_inside_span() {
        let content = "  a\r\n  b\r\nc";
        let candidates = collect(line_trimmed(content, "a\nb"));
        assert_eq!(candidates, vec!["  a\r\n  b\r"]);
    }

    #[test]
    fn test_block_anchor_single_candidate() {
        let content = "start\n  middle1\n  middle2\nend\nother";
        let find = "start\nmiddle1\nmiddle2\nend";
        assert_eq!(
            collect(block_anchor(content, find)),
            vec!["start\n  middle1\n  middle2\nend"]
        );
    }

    #[test]
    fn test_block_anchor_single_candidate_accepts_unrelated_interior() {
        // A lone anchor pair is trusted whatever sits between the anchors.
        let content = "begin\ncompletely\ndifferent\nstuff\nfinish";
        let find = "begin\nzzz\nfinish";
        assert_eq!(collect(block_anchor(content, find)), vec![content]);
    }

    #[test]
    fn test_block_anchor_too_few_lines() {
        assert!(collect(block_anchor("hello\nworld", "hello\nworld")).is_empty());
    }

    #[test]
    fn test_block_anchor_counts_trailing_newline_as_a_line() {
        // Two anchors and no interior: any block between them is accepted.
        assert_eq!(
            collect(block_anchor("hello\nx\nworld", "hello\nworld\n")),
            vec!["hello\nx\nworld"]
        );
        assert!(collect(context_aware("hello\nx\nworld", "hello\nworld\n")).is_empty());
    }

    #[test]
    fn test_block_anchor_picks_closest_interior() {
        let content = "fn a() {\n    let x = compute(1);\n}\nfn a() {\n    log::info!(\"hi\");\n}";
        let find = "fn a() {\n    let x = compute(2);\n}";
        assert_eq!(
            collect(block_anchor(content, find)),
            vec!["fn a() {\n    let x = compute(1);\n}"]
        );
    }

    #[test]
    fn test_block_anchor_rejects_weak_multiple_candidates() {
        let content = "open\naaaa\nclose\nopen\nbbbb\nclose";
        let find = "open\nzzzz\nclose";
        assert!(collect(block_anchor(content, find)).is_empty());
    }

    #[test]
    fn test_whitespace_normalized_single_line() {
        let candidates = collect(whitespace_normalized("let   x   =   1;", "let x = 1;"));
        assert_eq!(candidates, vec!["let   x   =   1;"]);
    }

    #[test]
    fn test_whitespace_normalized_inside_line() {
        let candidates = collect(whitespace_normalized("value = a b;", "a   b"));
        assert_eq!(candidates, vec!["a b"]);
    }

    #[test]
    fn test_whitespace_normalized_multiline() {
        let content = "if  (true)  {\n    return  1;\n}";
        let find = "if (true) {\n  return 1;\n}";
        assert_eq!(collect(whitespace_normalized(content, find)), vec![content]);
    }

    #[test]
    fn test_whitespace_normalized_blank_target() {
        assert!(collect(whitespace_normalized("a\n\nb", "  \n ")).is_empty());
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("    a\n\n      b"), "a\n\n  b");
        assert_eq!(dedent("   \n  "), "   \n  ");
    }

    #[test]
    fn test_indentation_flexible() {
        let content = "    function test() {\n        return 1;\n    }";
        let find = "function test() {\n    return 1;\n}";
        assert_eq!(collect(indentation_flexible(content, find)), vec![content]);
    }

    #[test]
    fn test_indentation_flexible_requires_same_relative_indent() {
        let content = "    a {\n    b\n    }";
        let find = "a {\n    b\n}";
        assert!(collect(indentation_flexible(content, find)).is_empty());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r#"\"q\" \$x \\ \`"#), "\"q\" $x \\ `");
        assert_eq!(unescape(r"\d stays"), r"\d stays");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_escape_normalized_direct() {
        let content = "console.log(\"hello\nworld\")";
        let find = "console.log(\\\"hello\\nworld\\\")";
        assert_eq!(collect(escape_normalized(content, find)), vec![content, content]);
    }

    #[test]
    fn test_escape_normalized_window() {
        // The document itself holds escapes that the target spells out.
        let content = "say(\\'hi\\')\nnext";
        let find = "say('hi')";
        assert_eq!(collect(escape_normalized(content, find)), vec!["say(\\'hi\\')"]);
    }

    #[test]
    fn test_trimmed_boundary() {
        let candidates = collect(trimmed_boundary("function test() {}", "\n  function test() {}  \n"));
        assert_eq!(candidates, vec!["function test() {}"]);
    }

    #[test]
    fn test_trimmed_boundary_already_trimmed() {
        assert!(collect(trimmed_boundary("hello", "hello")).is_empty());
    }

    #[test]
    fn test_context_aware_half_interior_matches() {
        let content = "head\n  one\n  two\n  changed\nfoot";
        let find = "head\none\ntwo\nthree\nfoot";
        assert_eq!(collect(context_aware(content, find)), vec![content]);
    }

    #[test]
    fn test_context_aware_rejects_mostly_different_interior() {
        let content = "head\n  x\n  y\n  z\nfoot";
        let find = "head\none\ntwo\nz\nfoot";
        assert!(collect(context_aware(content, find)).is_empty());
    }

    #[test]
    fn test_context_aware_requires_same_length() {
        let content = "head\none\nextra\ntwo\nfoot";
        let find = "head\none\ntwo\nfoot";
        assert!(collect(context_aware(content, find)).is_empty());
    }

    #[test]
    fn test_context_aware_blank_interior_always_accepts() {
        let content = "head\n\n\nfoot";
        let find = "head\n  \n\nfoot";
        assert_eq!(collect(context_aware(content, find)), vec![content]);
    }

    #[test]
    fn test_multi_occurrence() {
        assert_eq!(collect(multi_occurrence("aaa bbb aaa ccc aaa", "aaa")).len(), 3);
        assert!(collect(multi_occurrence("abc", "")).is_empty());
    }

    #[test]
    fn test_strategies_are_reentrant() {
        let content = "  x = 1\n  y = 2";
        let find = "x = 1\ny = 2";
        for strategy in PIPELINE {
            let first = collect((strategy.find)(content, find));
            let second = collect((strategy.find)(content, find));
            assert_eq!(first, second, "{} changed between runs", strategy.name);
        }
    }
}
