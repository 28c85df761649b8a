use strsim::levenshtein;

/// Similarity of two strings on a 0-100 scale, ignoring case.
///
/// The score is the Levenshtein distance normalized by the length of the
/// longer string: identical strings score 100, strings with nothing in
/// common score 0. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    ratio_lowercase(&a.to_lowercase(), &b.to_lowercase())
}

// Both arguments must already be lowercase.
pub(crate) fn ratio_lowercase(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100.0;
    }
    // Kept as a single division so that whole percentages stay exact.
    let common = longest - levenshtein(a, b);
    (100 * common) as f64 / longest as f64
}
