//! Candidate resolution: walk the strategy pipeline and decide whether the
//! target names exactly one place in the document.
//!
//! The first strategy whose candidates can be located in the document
//! settles the outcome. Later strategies are never consulted, so a clean
//! exact match can't be overridden by a fuzzier one.

use std::borrow::Cow;

use tracing::debug;

use crate::edit::strategies::{Strategy, PIPELINE};

/// A located candidate: literal document text at a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    /// Strategy that proposed the text.
    pub strategy: &'static str,
    /// Byte offset of the first occurrence.
    pub start: usize,
    /// Byte offset just past the first occurrence.
    pub end: usize,
    /// The literal text found in the document.
    pub text: Cow<'a, str>,
}

/// Terminal state of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The candidate occurs exactly once.
    Unique(Match<'a>),
    /// Replace-all mode: every occurrence of this candidate is the target.
    All(Match<'a>),
    /// The candidate occurs `count` times and replace-all was not requested.
    Ambiguous { strategy: &'static str, count: usize },
    /// No strategy produced a candidate present in the document.
    NotFound,
}

/// Resolve `target` against `content` with the default pipeline.
pub fn resolve<'a>(content: &'a str, target: &'a str, replace_all: bool) -> Resolution<'a> {
    resolve_with(PIPELINE, content, target, replace_all)
}

/// Resolve `target` against `content` using `pipeline`, in order.
pub fn resolve_with<'a>(
    pipeline: &[Strategy],
    content: &'a str,
    target: &'a str,
    replace_all: bool,
) -> Resolution<'a> {
    for strategy in pipeline {
        for candidate in (strategy.find)(content, target) {
            let Some(start) = content.find(&*candidate) else {
                continue;
            };
            let end = start + candidate.len();
            let found = Match {
                strategy: strategy.name,
                start,
                end,
                text: candidate,
            };

            if replace_all {
                debug!(strategy = strategy.name, "replace-all candidate selected");
                return Resolution::All(found);
            }

            if content.rfind(&*found.text) != Some(start) {
                let count = content.matches(&*found.text).count();
                debug!(strategy = strategy.name, count, "ambiguous candidate");
                return Resolution::Ambiguous {
                    strategy: strategy.name,
                    count,
                };
            }

            debug!(strategy = strategy.name, start, end, "unique match");
            return Resolution::Unique(found);
        }
        debug!(strategy = strategy.name, "no candidates");
    }

    Resolution::NotFound
}
