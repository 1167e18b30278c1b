/*!
 * Normalized text similarity scoring.
 *
 * The verification loop compares a chunk's source text against the
 * transcript that speech recognition produced from the synthesized audio.
 * Both strings are normalized and scored with the character-level
 * matching-blocks ratio `2 * M / T`, where `M` is the total length of all
 * matching blocks and `T` the combined length of both normalized strings.
 */

/// Normalize text for comparison: lower-case, collapse whitespace runs to
/// single spaces and trim the ends.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity ratio between two texts after normalization.
///
/// Returns a value in [0, 1], where 1 means the normalized texts are
/// identical. Two empty strings are considered identical.
pub fn similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_chars(&a, &b);
    (2.0 * matched as f32) / total as f32
}

/// Total number of characters covered by matching blocks.
///
/// Finds the longest common substring, then repeats on the unmatched pieces
/// to its left and right; an explicit work stack replaces recursion.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];

    while let Some(((a_lo, a_hi), (b_lo, b_hi))) = pending.pop() {
        let (i, j, size) = longest_match(a, a_lo, a_hi, b, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        total += size;
        pending.push(((a_lo, i), (b_lo, j)));
        pending.push(((i + size, a_hi), (j + size, b_hi)));
    }

    total
}

/// Longest matching block within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Returns `(i, j, size)` such that `a[i..i + size] == b[j..j + size]`,
/// preferring the earliest block in `a`, then in `b`.
fn longest_match(
    a: &[char],
    a_lo: usize,
    a_hi: usize,
    b: &[char],
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let width = b_hi - b_lo;
    let mut best = (a_lo, b_lo, 0);
    let mut run_lengths = vec![0usize; width];

    for i in a_lo..a_hi {
        let mut next_runs = vec![0usize; width];
        for j in b_lo..b_hi {
            if a[i] != b[j] {
                continue;
            }
            let run = if j > b_lo { run_lengths[j - b_lo - 1] } else { 0 } + 1;
            next_runs[j - b_lo] = run;
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        run_lengths = next_runs;
    }

    best
}
