//! Line view of a document.
//!
//! Lines are split on `\n` only. A `\r` left over from CRLF endings stays on
//! the line, so spans cut from the index keep the document's bytes intact.

/// A document split into lines, with the byte offset where each one starts.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            starts.push(offset);
            offset += line.len() + 1;
        }
        Self {
            text,
            lines,
            starts,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, i: usize) -> &'a str {
        self.lines[i]
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Byte offset of the first character of line `i`.
    pub fn start_of(&self, i: usize) -> usize {
        self.starts[i]
    }

    /// Byte offset just past the last character of line `i`, excluding its
    /// `\n`.
    pub fn end_of(&self, i: usize) -> usize {
        self.starts[i] + self.lines[i].len()
    }

    /// The literal document text covering lines `first..=last`.
    pub fn span(&self, first: usize, last: usize) -> &'a str {
        &self.text[self.start_of(first)..self.end_of(last)]
    }

    /// The literal document text of `count` lines starting at `first`.
    pub fn window(&self, first: usize, count: usize) -> &'a str {
        self.span(first, first + count - 1)
    }

    /// Start indices of every window of `count` lines.
    pub fn window_starts(&self, count: usize) -> std::ops::Range<usize> {
        if count == 0 {
            return 0..0;
        }
        0..(self.len() + 1).saturating_sub(count)
    }
}

/// Split a target snippet into lines, dropping the empty final line left by a
/// trailing newline.
pub fn target_lines(target: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = target.split('\n').collect();
    if lines.len() > 1 && lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}
