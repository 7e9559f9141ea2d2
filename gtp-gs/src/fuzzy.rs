//! Guess sanitization and similarity scoring
//!
//! Scores are integer percentages (0-100) of normalized Levenshtein
//! similarity over lowercased names, so configured thresholds compare
//! directly against them.

/// Normalize a raw guess for comparison.
///
/// Trims, collapses whitespace runs to single spaces, and strips everything
/// except alphanumerics, underscore, space, hyphen and apostrophe. The
/// result may be empty; callers reject that as invalid input.
pub fn sanitize_guess(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | '\''))
        .collect();
    // Collapse after stripping so removed junk cannot leave doubled spaces.
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of a guess to a candidate name as a 0-100 score.
///
/// Case-insensitive; an exact match scores 100.
pub fn similarity(guess: &str, name: &str) -> u8 {
    let score = strsim::normalized_levenshtein(&guess.to_lowercase(), &name.to_lowercase());
    (score * 100.0).round() as u8
}

/// Best-scoring candidate for a guess.
///
/// Returns the winning index and its score. Ties keep the earliest
/// candidate, so a stable input ordering gives a deterministic winner.
pub fn best_match<S: AsRef<str>>(guess: &str, names: &[S]) -> Option<(usize, u8)> {
    let mut best: Option<(usize, u8)> = None;
    for (i, name) in names.iter().enumerate() {
        let score = similarity(guess, name.as_ref());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best
}
