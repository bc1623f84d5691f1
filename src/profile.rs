// 🏢 Entity Profile Builder - Aggregate a resolved cluster into one profile
// Sums defensively-parsed amounts across all aliases, collects sources,
// scores risk with an additive capped scheme, and classifies entity type.

use crate::normalize::is_corporate_suffix;
use crate::record::RawRecord;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// ENTITY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    /// Two-token personal name with no corporate suffix
    Individual,

    /// Contains a governmental-unit keyword
    Government,

    /// Contains a nonprofit keyword
    Nonprofit,

    /// Default
    Company,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Individual => "individual",
            EntityType::Government => "government",
            EntityType::Nonprofit => "nonprofit",
            EntityType::Company => "company",
        }
    }
}

const GOVERNMENT_KEYWORDS: &[&str] = &[
    "department",
    "agency",
    "bureau",
    "office",
    "authority",
    "commission",
];

const NONPROFIT_KEYWORDS: &[&str] = &[
    "foundation",
    "institute",
    "association",
    "society",
    "council",
];

/// Classify an entity name. Independent of risk scoring.
///
/// Precedence: governmental/nonprofit keywords beat the two-token
/// individual rule. "Port Authority" and "Ford Foundation" are two tokens
/// with no corporate suffix, but they are not personal names.
pub fn classify_entity_type(name: &str) -> EntityType {
    let lowered = name.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    if tokens.len() == 2 && !tokens.iter().any(|t| is_corporate_suffix(t)) {
        if !tokens
            .iter()
            .any(|t| GOVERNMENT_KEYWORDS.contains(t) || NONPROFIT_KEYWORDS.contains(t))
        {
            return EntityType::Individual;
        }
    }

    if tokens.iter().any(|t| GOVERNMENT_KEYWORDS.contains(t)) {
        return EntityType::Government;
    }

    if tokens.iter().any(|t| NONPROFIT_KEYWORDS.contains(t)) {
        return EntityType::Nonprofit;
    }

    EntityType::Company
}

// ============================================================================
// RISK WEIGHTS
// ============================================================================

/// Caller-tunable risk scoring table.
///
/// The scheme is additive and capped at 100. It is intentionally simple and
/// monotonic: more money, more sources, and more recent activity never
/// lower the score. Keep every point value non-negative when tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Points when total_amount exceeds `amount_high_threshold` (default 30)
    pub amount_high_points: u8,
    /// Points for the middle amount tier (default 20)
    pub amount_mid_points: u8,
    /// Points for the low amount tier (default 10)
    pub amount_low_points: u8,

    pub amount_high_threshold: f64,
    pub amount_mid_threshold: f64,
    pub amount_low_threshold: f64,

    /// Points for activity in 3+ distinct sources (default 25)
    pub sources_many_points: u8,
    /// Points for activity in exactly 2 sources (default 15)
    pub sources_two_points: u8,

    /// Points when any record came through a lobbying channel (default 20)
    pub lobbying_points: u8,

    /// Points when any record falls in the two most recent calendar
    /// years (default 15)
    pub recency_points: u8,
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            amount_high_points: 30,
            amount_mid_points: 20,
            amount_low_points: 10,
            amount_high_threshold: 10_000_000.0,
            amount_mid_threshold: 1_000_000.0,
            amount_low_threshold: 100_000.0,
            sources_many_points: 25,
            sources_two_points: 15,
            lobbying_points: 20,
            recency_points: 15,
        }
    }
}

// ============================================================================
// ENTITY PROFILE
// ============================================================================

/// Canonical profile for one resolved entity cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Stable identity (UUID) assigned at build time
    pub id: String,

    /// Representative name chosen for the cluster
    pub canonical_name: String,

    /// All name variants, always including the canonical name
    pub aliases: BTreeSet<String>,

    /// Distinct source identifiers seen across all records
    pub sources: BTreeSet<String>,

    /// Sum of defensively-parsed amounts across all aliases (>= 0 inputs
    /// permitting; unparsable amounts contribute zero)
    pub total_amount: f64,

    /// Total records across all aliases
    pub record_count: usize,

    /// Additive capped heuristic, 0-100
    pub risk_score: u8,

    pub entity_type: EntityType,
}

// ============================================================================
// PROFILE BUILDER
// ============================================================================

pub struct ProfileBuilder {
    weights: RiskWeights,

    /// Year the recency window is computed against. "Recent" means this
    /// year or the one before it.
    as_of_year: i32,
}

impl ProfileBuilder {
    /// Builder with default weights, recency anchored to today
    pub fn new() -> Self {
        ProfileBuilder {
            weights: RiskWeights::default(),
            as_of_year: Utc::now().year(),
        }
    }

    pub fn with_weights(weights: RiskWeights) -> Self {
        ProfileBuilder {
            weights,
            as_of_year: Utc::now().year(),
        }
    }

    /// Pin the recency anchor year (deterministic scoring in tests and
    /// re-runs over historical snapshots)
    pub fn as_of_year(mut self, year: i32) -> Self {
        self.as_of_year = year;
        self
    }

    /// Aggregate one cluster's records into an EntityProfile.
    pub fn build_profile(
        &self,
        canonical: &str,
        aliases: &[String],
        records_by_alias: &HashMap<String, Vec<RawRecord>>,
    ) -> EntityProfile {
        let mut alias_set: BTreeSet<String> = aliases.iter().cloned().collect();
        alias_set.insert(canonical.to_string());

        let mut sources = BTreeSet::new();
        let mut total_amount = 0.0;
        let mut record_count = 0;
        let mut has_lobbying = false;
        let mut has_recent = false;

        for alias in &alias_set {
            let Some(records) = records_by_alias.get(alias) else {
                continue;
            };
            for record in records {
                record_count += 1;
                total_amount += record.amount_numeric();
                if !record.source.is_empty() {
                    sources.insert(record.source.clone());
                }
                if record.source.to_lowercase().contains("lobby") {
                    has_lobbying = true;
                }
                if self.is_recent(record) {
                    has_recent = true;
                }
            }
        }

        let risk_score =
            self.risk_score(total_amount, sources.len(), has_lobbying, has_recent);

        EntityProfile {
            id: uuid::Uuid::new_v4().to_string(),
            canonical_name: canonical.to_string(),
            aliases: alias_set,
            sources,
            total_amount,
            record_count,
            risk_score,
            entity_type: classify_entity_type(canonical),
        }
    }

    /// Additive capped score. Monotonic in amount, source count, and the
    /// lobbying/recency flags.
    fn risk_score(
        &self,
        total_amount: f64,
        source_count: usize,
        has_lobbying: bool,
        has_recent: bool,
    ) -> u8 {
        let w = &self.weights;
        let mut score: u32 = 0;

        if total_amount > w.amount_high_threshold {
            score += w.amount_high_points as u32;
        } else if total_amount > w.amount_mid_threshold {
            score += w.amount_mid_points as u32;
        } else if total_amount > w.amount_low_threshold {
            score += w.amount_low_points as u32;
        }

        if source_count >= 3 {
            score += w.sources_many_points as u32;
        } else if source_count >= 2 {
            score += w.sources_two_points as u32;
        }

        if has_lobbying {
            score += w.lobbying_points as u32;
        }

        if has_recent {
            score += w.recency_points as u32;
        }

        score.min(100) as u8
    }

    /// Whether the record falls in the two most recent calendar years.
    /// Uses the parsed date when present, the filing-year metadata otherwise.
    fn is_recent(&self, record: &RawRecord) -> bool {
        let year = record
            .parsed_date()
            .map(|d| d.year())
            .or(record.year);
        match year {
            Some(y) => y >= self.as_of_year - 1,
            None => false,
        }
    }
}

impl Default for ProfileBuilder {
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

    fn builder() -> ProfileBuilder {
        ProfileBuilder::new().as_of_year(2024)
    }

    fn records_map(entries: Vec<(&str, Vec<RawRecord>)>) -> HashMap<String, Vec<RawRecord>> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_profile_aggregation() {
        let records = records_map(vec![
            (
                "Acme Inc",
                vec![
                    record("Acme Inc", "nyc_payments", 500_000.0, "2020-03-01"),
                    record("Acme Inc", "nyc_payments", 250_000.0, "2020-06-01"),
                ],
            ),
            (
                "ACME",
                vec![record("ACME", "senate_lobbying", 100_000.0, "2024-01-15")],
            ),
        ]);

        let profile = builder().build_profile(
            "Acme Inc",
            &["Acme Inc".to_string(), "ACME".to_string()],
            &records,
        );

        assert_eq!(profile.canonical_name, "Acme Inc");
        assert!(profile.aliases.contains("Acme Inc"));
        assert!(profile.aliases.contains("ACME"));
        assert_eq!(profile.record_count, 3);
        assert_eq!(profile.total_amount, 850_000.0);
        assert_eq!(profile.sources.len(), 2);
    }

    #[test]
    fn test_aliases_always_include_canonical() {
        let profile = builder().build_profile("Acme Inc", &[], &HashMap::new());
        assert!(profile.aliases.contains("Acme Inc"));
        assert_eq!(profile.record_count, 0);
        assert_eq!(profile.total_amount, 0.0);
    }

    #[test]
    fn test_risk_score_components() {
        // 850k total (+10), 2 sources (+15), lobbying (+20), recent (+15) = 60
        let records = records_map(vec![
            (
                "Acme Inc",
                vec![record("Acme Inc", "nyc_payments", 750_000.0, "2020-03-01")],
            ),
            (
                "ACME",
                vec![record("ACME", "senate_lobbying", 100_000.0, "2024-01-15")],
            ),
        ]);
        let profile = builder().build_profile(
            "Acme Inc",
            &["Acme Inc".to_string(), "ACME".to_string()],
            &records,
        );
        assert_eq!(profile.risk_score, 60);
    }

    #[test]
    fn test_risk_score_capped_at_100() {
        // 30 + 25 + 20 + 15 = 90 with defaults; inflate the weights to
        // prove the cap holds
        let weights = RiskWeights {
            amount_high_points: 60,
            sources_many_points: 50,
            lobbying_points: 40,
            recency_points: 30,
            ..RiskWeights::default()
        };
        let records = records_map(vec![
            (
                "Acme Inc",
                vec![record("Acme Inc", "nyc_payments", 20_000_000.0, "2024-03-01")],
            ),
            ("A", vec![record("A", "nyc_lobbying", 1.0, "2024-01-01")]),
            ("B", vec![record("B", "federal_contracts", 1.0, "2024-01-01")]),
        ]);
        let profile = ProfileBuilder::with_weights(weights)
            .as_of_year(2024)
            .build_profile(
                "Acme Inc",
                &["Acme Inc".to_string(), "A".to_string(), "B".to_string()],
                &records,
            );
        assert_eq!(profile.risk_score, 100);
    }

    #[test]
    fn test_risk_monotonic_in_amount() {
        let b = builder();
        let amounts = [0.0, 150_000.0, 2_000_000.0, 20_000_000.0];
        let mut last = 0;
        for amount in amounts {
            let records = records_map(vec![(
                "Acme Inc",
                vec![record("Acme Inc", "nyc_payments", amount, "2019-01-01")],
            )]);
            let profile = b.build_profile("Acme Inc", &["Acme Inc".to_string()], &records);
            assert!(
                profile.risk_score >= last,
                "risk dropped from {} to {} at amount {}",
                last,
                profile.risk_score,
                amount
            );
            last = profile.risk_score;
        }
    }

    #[test]
    fn test_risk_monotonic_in_sources() {
        let b = builder();
        let mut last = 0;
        for source_count in 1..=3 {
            let sources = ["nyc_payments", "federal_contracts", "state_grants"];
            let records = records_map(vec![(
                "Acme Inc",
                sources[..source_count]
                    .iter()
                    .map(|s| record("Acme Inc", s, 1.0, "2019-01-01"))
                    .collect(),
            )]);
            let profile = b.build_profile("Acme Inc", &["Acme Inc".to_string()], &records);
            assert!(profile.risk_score >= last);
            last = profile.risk_score;
        }
    }

    #[test]
    fn test_recency_uses_year_metadata_fallback() {
        let mut r = RawRecord::new("Acme Inc", "nyc_payments");
        r.year = Some(2023);
        let records = records_map(vec![("Acme Inc", vec![r])]);
        let profile = builder().build_profile("Acme Inc", &["Acme Inc".to_string()], &records);
        // recency +15 only
        assert_eq!(profile.risk_score, 15);
    }

    #[test]
    fn test_unparsable_amounts_contribute_zero() {
        let mut r = RawRecord::new("Acme Inc", "nyc_payments");
        r.amount = Some(json!("withheld"));
        let records = records_map(vec![("Acme Inc", vec![r])]);
        let profile = builder().build_profile("Acme Inc", &["Acme Inc".to_string()], &records);
        assert_eq!(profile.total_amount, 0.0);
        assert_eq!(profile.record_count, 1);
    }

    #[test]
    fn test_entity_type_individual() {
        assert_eq!(classify_entity_type("Jane Smith"), EntityType::Individual);
    }

    #[test]
    fn test_entity_type_two_tokens_with_suffix_is_company() {
        assert_eq!(classify_entity_type("Acme Inc"), EntityType::Company);
    }

    #[test]
    fn test_entity_type_government() {
        assert_eq!(
            classify_entity_type("Department of Education"),
            EntityType::Government
        );
        assert_eq!(
            classify_entity_type("Port Authority"),
            EntityType::Government
        );
    }

    #[test]
    fn test_entity_type_nonprofit() {
        assert_eq!(
            classify_entity_type("Ford Foundation"),
            EntityType::Nonprofit
        );
        assert_eq!(
            classify_entity_type("Urban Policy Institute"),
            EntityType::Nonprofit
        );
    }

    #[test]
    fn test_entity_type_default_company() {
        assert_eq!(
            classify_entity_type("Consolidated Widget Manufacturing"),
            EntityType::Company
        );
    }
}
