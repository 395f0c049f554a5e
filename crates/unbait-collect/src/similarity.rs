//! Character-sequence similarity for title deduplication.

use std::collections::HashMap;

/// Similarity ratio between two strings, case-insensitive, in `[0.0, 1.0]`.
///
/// Computed as `2·M / (len(a) + len(b))` where `M` is the total size of the
/// matching blocks found by repeatedly taking the longest common substring
/// and recursing on the pieces to its left and right. Symmetric; `1.0` for
/// identical strings (ignoring case).
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matches = matching_chars(&a, &b);
    #[allow(clippy::cast_precision_loss)]
    let ratio = (2.0 * matches as f64) / ((a.len() + b.len()) as f64);
    ratio
}

/// Total number of matching characters across all matching blocks.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                queue.push((i + size, ahi, j + size, bhi));
            }
        }
    }

    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)` — the earliest such block when several tie.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    // Length of the common suffix ending at each position of b, for the
    // previous row of a.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut new_runs: HashMap<usize, usize> = HashMap::new();
        for j in blo..bhi {
            if b[j] != a[i] {
                continue;
            }
            let k = if j == 0 {
                1
            } else {
                run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
            };
            new_runs.insert(j, k);
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        run_lengths = new_runs;
    }

    best
}
