//! "Did you mean" candidates for unresolved variable paths.

/// Maximum number of suggestions attached to a diagnostic.
pub const MAX_SUGGESTIONS: usize = 3;

/// Pick up to [`MAX_SUGGESTIONS`] candidates close to `wanted`.
///
/// A candidate qualifies when it is within edit distance 2, shares a
/// three-character prefix, or one contains the other. Closest first.
pub fn suggest<'a>(wanted: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let wanted_lower = wanted.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|c| *c != wanted)
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let distance = levenshtein(&wanted_lower, &lower);
            let related = distance <= 2
                || shares_prefix(&wanted_lower, &lower, 3)
                || lower.contains(&wanted_lower)
                || wanted_lower.contains(&lower);
            related.then_some((distance, candidate))
        })
        .collect();

    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.to_owned())
        .collect()
}

fn shares_prefix(a: &str, b: &str, n: usize) -> bool {
    let mut a = a.chars();
    let mut b = b.chars();
    (0..n).all(|_| matches!((a.next(), b.next()), (Some(x), Some(y)) if x == y))
}

/// Classic two-row edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("name", "name"), 0);
    }

    #[test]
    fn close_typos_are_suggested_first() {
        let got = suggest("nmae", ["name", "namespace", "region"]);
        assert_eq!(got.first().map(String::as_str), Some("name"));
        assert!(!got.contains(&"region".to_owned()));
    }

    #[test]
    fn substring_matches_qualify() {
        let got = suggest("engine", ["resources[0].configuration.engine", "tags"]);
        assert_eq!(got, ["resources[0].configuration.engine"]);
    }

    #[test]
    fn at_most_three_suggestions() {
        let got = suggest("res", ["res1", "res2", "res3", "res4"]);
        assert_eq!(got.len(), MAX_SUGGESTIONS);
    }
}
