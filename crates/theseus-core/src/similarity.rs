//! Textual similarity between two lines.
//!
//! Similarity is `1 - edit_distance / max_len` over whitespace-trimmed input,
//! so indentation and trailing-space changes never count as edits.

/// Lines scoring at or above this are considered "original".
///
/// Lower values let unrelated lines match; higher values treat pure
/// reformatting as a rewrite.
pub const ORIGINALITY_THRESHOLD: f64 = 0.25;

/// Unit-cost Levenshtein distance counted in `char`s.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Score how similar two lines are, in `[0.0, 1.0]`.
///
/// Symmetric and deterministic. Identical (after trimming) lines score 1.0;
/// an empty line against a non-empty one scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim();
    let b = b.trim();

    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    let score = 1.0 - edit_distance(a, b) as f64 / max_len as f64;
    score.clamp(0.0, 1.0)
}

/// Whether a similarity score counts as "original".
pub fn is_original(similarity: f64) -> bool {
    similarity >= ORIGINALITY_THRESHOLD
}
