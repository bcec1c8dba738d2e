//! Nearest-match suggestions.

use std::sync::Arc;

/// Pluggable string distance: smaller is closer.
pub type DistanceFn = Arc<dyn Fn(&str, &str) -> usize + Send + Sync>;

/// Levenshtein edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rolling rows of the DP matrix.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];
    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Up to `limit` candidates closest to `target`, closest first, ties by name.
pub(super) fn nearest<'c>(
    target: &str,
    candidates: impl IntoIterator<Item = &'c str>,
    distance: &dyn Fn(&str, &str) -> usize,
    limit: usize,
) -> Vec<&'c str> {
    let mut scored: Vec<(usize, &'c str)> = candidates
        .into_iter()
        .map(|c| (distance(target, c), c))
        .collect();
    scored.sort_unstable();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("TURN_ON_X", "TURN_ON"), 2);
        assert_eq!(levenshtein("TURN_ON_X", "TURN_OFF"), 3);
    }

    #[test]
    fn nearest_orders_by_distance_then_name() {
        let got = nearest(
            "TURN_ON_X",
            ["TURN_OFF", "TURN_ON", "RESET", "TURN_ON"],
            &levenshtein,
            3,
        );
        assert_eq!(got, ["TURN_ON", "TURN_OFF", "RESET"]);
    }

    #[test]
    fn nearest_respects_limit_and_custom_distance() {
        let by_len = |a: &str, b: &str| a.len().abs_diff(b.len());
        let got = nearest("abcd", ["a", "abc", "ab", "abcde"], &by_len, 2);
        assert_eq!(got, ["abc", "abcde"]);
    }
}
