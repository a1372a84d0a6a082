//! Levenshtein edit distance.
//!
//! Only ever used as a similarity metric by the block-anchor strategy;
//! a high score is a ranking signal, not proof that two lines are the same.

/// Minimum number of single-character insertions, deletions, and
/// substitutions that turn `a` into `b`.
///
/// Works on `char`s, so multi-byte text counts one edit per character.
/// Fills the full `(m + 1) x (n + 1)` table; there is no cutoff or
/// approximation.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 || n == 0 {
        return m.max(n);
    }

    let mut table = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in table[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
        }
    }

    table[m][n]
}

/// `1 - distance / max_len`, clamped to `[0, 1]`.
///
/// Two empty strings are identical (1.0).
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let score = 1.0 - distance(a, b) as f64 / max_len as f64;
    score.clamp(0.0, 1.0)
}
