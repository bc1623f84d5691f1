// 🎯 Similarity Scorer - Blended fuzzy score between two entity names
// Four independent string metrics, weighted so the token-set ratio dominates:
// corporate names vary most by token inclusion and order
// ("Google Client Services LLC" vs "Google Inc").

use crate::normalize::normalize;
use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

// ============================================================================
// WEIGHTS
// ============================================================================

/// Fixed metric weights. Must sum to 1.0; the blend is deterministic.
const WEIGHT_FULL: f64 = 0.15;
const WEIGHT_PARTIAL: f64 = 0.20;
const WEIGHT_TOKEN_SORT: f64 = 0.30;
const WEIGHT_TOKEN_SET: f64 = 0.35;

// ============================================================================
// SIMILARITY
// ============================================================================

/// Blended similarity between two raw entity names, in [0, 1].
///
/// Both names are normalized first; identical normalized forms short-circuit
/// to 1.0 (most comparisons in a large pool are non-matches, but the exact
/// path is the hot one for true aliases like "ACME" vs "Acme Inc").
///
/// Symmetric: `similarity(a, b) == similarity(b, a)`.
pub fn similarity(name_a: &str, name_b: &str) -> f64 {
    let norm_a = normalize(name_a);
    let norm_b = normalize(name_b);
    similarity_normalized(&norm_a, &norm_b)
}

/// Blended similarity over already-normalized names.
///
/// Callers that cache normalization (the matcher, the clusterer) use this
/// directly to avoid re-normalizing on every pair.
pub fn similarity_normalized(norm_a: &str, norm_b: &str) -> f64 {
    if norm_a == norm_b {
        // Covers the both-empty case as well
        return 1.0;
    }
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }

    let full = normalized_levenshtein(norm_a, norm_b);
    let partial = partial_ratio(norm_a, norm_b);
    let token_sort = token_sort_ratio(norm_a, norm_b);
    let token_set = token_set_ratio(norm_a, norm_b);

    let blended = full * WEIGHT_FULL
        + partial * WEIGHT_PARTIAL
        + token_sort * WEIGHT_TOKEN_SORT
        + token_set * WEIGHT_TOKEN_SET;

    blended.clamp(0.0, 1.0)
}

// ============================================================================
// COMPONENT METRICS
// ============================================================================

/// Best-substring ratio: slides a window the length of the shorter string
/// across the longer and keeps the best edit-distance score.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short_chars: Vec<char> = shorter.chars().collect();
    let long_chars: Vec<char> = longer.chars().collect();

    if short_chars.is_empty() {
        return 0.0;
    }
    if short_chars.len() == long_chars.len() {
        return normalized_levenshtein(shorter, longer);
    }

    let window = short_chars.len();
    let mut best: f64 = 0.0;
    for start in 0..=(long_chars.len() - window) {
        let slice: String = long_chars[start..start + window].iter().collect();
        let score = normalized_levenshtein(shorter, &slice);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Token-order-insensitive ratio: tokens sorted before comparing
fn token_sort_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b))
}

/// Token-set ratio: compares the shared-token core against each side's
/// core-plus-remainder, ignoring repeats and order. Scores high when one
/// name's tokens are a subset of the other's.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let core = intersection.join(" ");
    let combined_a = join_nonempty(&core, &only_a.join(" "));
    let combined_b = join_nonempty(&core, &only_b.join(" "));

    let core_vs_a = normalized_levenshtein(&core, &combined_a);
    let core_vs_b = normalized_levenshtein(&core, &combined_b);
    let a_vs_b = normalized_levenshtein(&combined_a, &combined_b);

    core_vs_a.max(core_vs_b).max(a_vs_b)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_nonempty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{} {}", left, right),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(similarity("Acme Inc", "Acme Inc"), 1.0);
        assert_eq!(similarity("Google", "Google"), 1.0);
    }

    #[test]
    fn test_exact_after_normalization() {
        // Suffix-stripped forms are identical → short-circuit to 1.0
        assert_eq!(similarity("Acme Inc", "ACME"), 1.0);
        assert_eq!(similarity("Google LLC", "google inc"), 1.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("Google Client Services LLC", "Google Inc"),
            ("Acme Industries", "Acme Industrial Supply"),
            ("Johnson & Johnson", "Johnson"),
            ("", "Something"),
        ];
        for (a, b) in pairs {
            let ab = similarity(a, b);
            let ba = similarity(b, a);
            assert!(
                (ab - ba).abs() < 1e-12,
                "asymmetric for ({:?}, {:?}): {} vs {}",
                a,
                b,
                ab,
                ba
            );
        }
    }

    #[test]
    fn test_subset_names_score_high() {
        // Token-set ratio should dominate here
        let score = similarity("Google Client Services LLC", "Google Inc");
        assert!(score > 0.5, "got {}", score);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let score = similarity("Google Inc", "Microsoft Corp");
        assert!(score < 0.5, "got {}", score);
    }

    #[test]
    fn test_empty_vs_nonempty() {
        assert_eq!(similarity("", "Acme Inc"), 0.0);
        assert_eq!(similarity("Acme Inc", ""), 0.0);
    }

    #[test]
    fn test_bounds() {
        let pairs = [
            ("Acme Inc", "Acme Industries"),
            ("X", "Y"),
            ("Alpha Beta Gamma", "Gamma Beta Alpha"),
        ];
        for (a, b) in pairs {
            let score = similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "out of bounds: {}", score);
        }
    }

    #[test]
    fn test_token_order_insensitive() {
        // Same tokens, different order: token-sort and token-set both max out
        let score = similarity("Smith and Wesson", "Wesson and Smith");
        assert!(score > 0.85, "got {}", score);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_FULL + WEIGHT_PARTIAL + WEIGHT_TOKEN_SORT + WEIGHT_TOKEN_SET;
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
