// 🔗 Cross-Source Matcher - Find the same entity across two jurisdictions
// Pairwise O(|A|·|B|) comparison with the blended similarity score.
// Acceptable because both sets are bounded per query (tens to low hundreds);
// larger inputs should be capped by the caller before invocation.

use crate::normalize::NormalizerCache;
use crate::similarity::similarity_normalized;
use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// RECORD MATCH
// ============================================================================

/// One matched pair: a jurisdiction-A record, a jurisdiction-B record, and
/// how confident we are they name the same organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMatch {
    pub record_a: RawRecord,
    pub record_b: RawRecord,

    /// Similarity confidence (0.0 - 1.0)
    pub confidence: f64,
}

// ============================================================================
// CROSS-SOURCE MATCHER
// ============================================================================

pub struct CrossSourceMatcher {
    /// Minimum confidence to retain a pair (default 0.8)
    pub threshold: f64,
}

impl CrossSourceMatcher {
    pub fn new() -> Self {
        CrossSourceMatcher { threshold: 0.8 }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        CrossSourceMatcher { threshold }
    }

    /// Compare every named record in A against every named record in B.
    ///
    /// Pairs at or above the threshold are grouped by A's entity name and
    /// sorted by confidence descending within each group. Records with an
    /// empty name are skipped; empty inputs produce an empty map.
    pub fn find_matches(
        &self,
        set_a: &[RawRecord],
        set_b: &[RawRecord],
    ) -> HashMap<String, Vec<RecordMatch>> {
        let mut cache = NormalizerCache::new();
        // Pairwise memo keyed by normalized forms; scoped to this call
        let mut pair_memo: HashMap<(String, String), f64> = HashMap::new();

        let mut grouped: HashMap<String, Vec<RecordMatch>> = HashMap::new();

        for record_a in set_a {
            if record_a.name.trim().is_empty() {
                continue;
            }
            let norm_a = cache.normalize(&record_a.name);

            for record_b in set_b {
                if record_b.name.trim().is_empty() {
                    continue;
                }
                let norm_b = cache.normalize(&record_b.name);

                let key = (norm_a.clone(), norm_b.clone());
                let confidence = match pair_memo.get(&key) {
                    Some(cached) => *cached,
                    None => {
                        let score = similarity_normalized(&norm_a, &norm_b);
                        pair_memo.insert(key, score);
                        score
                    }
                };

                if confidence >= self.threshold {
                    grouped
                        .entry(record_a.name.clone())
                        .or_default()
                        .push(RecordMatch {
                            record_a: record_a.clone(),
                            record_b: record_b.clone(),
                            confidence,
                        });
                }
            }
        }

        for matches in grouped.values_mut() {
            matches.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        log::debug!(
            "cross-source match: {}x{} records -> {} matched entities",
            set_a.len(),
            set_b.len(),
            grouped.len()
        );

        grouped
    }
}

impl Default for CrossSourceMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, source: &str, amount: f64, date: &str) -> RawRecord {
        let mut r = RawRecord::new(name, source);
        r.amount = Some(json!(amount));
        r.date = Some(date.to_string());
        r
    }

    #[test]
    fn test_suffix_variants_match() {
        let matcher = CrossSourceMatcher::new();
        let set_a = vec![record("Acme Inc", "nyc_payments", 100_000.0, "2021-01-01")];
        let set_b = vec![record("ACME", "senate_lobbying", 2_000_000.0, "2019-06-01")];

        let matches = matcher.find_matches(&set_a, &set_b);

        assert_eq!(matches.len(), 1);
        let group = &matches["Acme Inc"];
        assert_eq!(group.len(), 1);
        assert!(group[0].confidence >= 0.8);
    }

    #[test]
    fn test_unrelated_names_do_not_match() {
        let matcher = CrossSourceMatcher::new();
        let set_a = vec![record("Acme Inc", "nyc_payments", 100.0, "2021-01-01")];
        let set_b = vec![record("Globex Corporation", "senate_lobbying", 100.0, "2021-01-01")];

        let matches = matcher.find_matches(&set_a, &set_b);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_inputs_give_empty_map() {
        let matcher = CrossSourceMatcher::new();
        let set_b = vec![record("Acme", "senate_lobbying", 1.0, "2021-01-01")];

        assert!(matcher.find_matches(&[], &set_b).is_empty());
        assert!(matcher.find_matches(&set_b, &[]).is_empty());
    }

    #[test]
    fn test_empty_names_skipped() {
        let matcher = CrossSourceMatcher::new();
        let set_a = vec![record("", "nyc_payments", 100.0, "2021-01-01")];
        let set_b = vec![record("", "senate_lobbying", 100.0, "2021-01-01")];

        assert!(matcher.find_matches(&set_a, &set_b).is_empty());
    }

    #[test]
    fn test_groups_sorted_by_confidence_descending() {
        let matcher = CrossSourceMatcher::with_threshold(0.5);
        let set_a = vec![record(
            "Google Client Services",
            "nyc_payments",
            1.0,
            "2021-01-01",
        )];
        let set_b = vec![
            record("Google Client Svc", "senate_lobbying", 1.0, "2021-01-01"),
            record("Google Client Services LLC", "senate_lobbying", 1.0, "2021-01-01"),
        ];

        let matches = matcher.find_matches(&set_a, &set_b);
        let group = &matches["Google Client Services"];
        assert!(group.len() >= 2);
        for pair in group.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_one_a_record_can_match_many_b_records() {
        let matcher = CrossSourceMatcher::new();
        let set_a = vec![record("Acme Inc", "nyc_payments", 1.0, "2021-01-01")];
        let set_b = vec![
            record("ACME", "senate_lobbying", 1.0, "2019-06-01"),
            record("Acme Corporation", "senate_lobbying", 1.0, "2020-06-01"),
        ];

        let matches = matcher.find_matches(&set_a, &set_b);
        assert_eq!(matches["Acme Inc"].len(), 2);
    }
}
