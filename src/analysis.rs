// 🧭 Correlation Analysis - Strategy label, blended score, and the pipeline
// Ties the matcher, timeline, and financial analyzers together into one
// CompanyAnalysis, plus the list-level entity resolution path.

use crate::clustering::{canonical_name, ClusterConfig, EntityClusterer};
use crate::financial::{AmountRatio, FinancialAnalysis, FinancialAnalyzer};
use crate::matching::{CrossSourceMatcher, RecordMatch};
use crate::profile::{EntityProfile, ProfileBuilder, RiskWeights};
use crate::record::RawRecord;
use crate::timeline::{TimelineAnalysis, TimelineAnalyzer};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// STRATEGIC CLASSIFICATION
// ============================================================================

/// Qualitative label for an entity's cross-jurisdiction posture.
/// Jurisdiction A is local, jurisdiction B federal; gap sign convention is
/// the one documented on TimelineAnalysis (negative = B led).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategicClassification {
    /// No spend on either side
    NoActivity,

    /// Spend only in jurisdiction B
    BOnly,

    /// Spend only in jurisdiction A
    AOnly,

    /// B led by over a year and outspends A more than 100:1
    BFirstHeavy,

    /// B led by over a year
    BFirst,

    /// A led by over a year
    AFirst,

    /// Concurrent, B outspends more than 100:1
    BFocused,

    /// Concurrent, B outspends more than 10:1
    BLeaning,

    /// Concurrent, B outspends (ratio > 1)
    BalancedB,

    /// Concurrent, A outspends but B is present (ratio > 0.1)
    BalancedA,

    /// Concurrent, A dominates (ratio <= 0.1)
    AFocused,
}

impl StrategicClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategicClassification::NoActivity => "No-Activity",
            StrategicClassification::BOnly => "B-Only",
            StrategicClassification::AOnly => "A-Only",
            StrategicClassification::BFirstHeavy => "B-First-Heavy",
            StrategicClassification::BFirst => "B-First",
            StrategicClassification::AFirst => "A-First",
            StrategicClassification::BFocused => "B-Focused",
            StrategicClassification::BLeaning => "B-Leaning",
            StrategicClassification::BalancedB => "Balanced-B",
            StrategicClassification::BalancedA => "Balanced-A",
            StrategicClassification::AFocused => "A-Focused",
        }
    }
}

/// Total decision function: every input combination maps to exactly one
/// label. The zero-activity cases are checked before the ratio is consulted,
/// so an Undefined ratio only ever reaches the concurrent bands when B has
/// spend and A does not — which the BOnly branch already caught.
pub fn classify_strategy(
    ratio: AmountRatio,
    gap_days: Option<i64>,
    total_a: f64,
    total_b: f64,
) -> StrategicClassification {
    if total_a == 0.0 && total_b == 0.0 {
        return StrategicClassification::NoActivity;
    }
    if total_a == 0.0 {
        return StrategicClassification::BOnly;
    }
    if total_b == 0.0 {
        return StrategicClassification::AOnly;
    }

    // Both sides active; ratio is Defined here, but branch explicitly
    let ratio_value = match ratio {
        AmountRatio::Defined(v) => v,
        AmountRatio::Undefined => {
            // Unreachable given the total checks above; classify as the
            // most B-dominant concurrent band rather than panic
            return StrategicClassification::BFocused;
        }
    };

    match gap_days {
        // B led by over a year
        Some(gap) if gap < -365 => {
            if ratio_value > 100.0 {
                StrategicClassification::BFirstHeavy
            } else {
                StrategicClassification::BFirst
            }
        }
        // A led by over a year
        Some(gap) if gap > 365 => StrategicClassification::AFirst,
        // Concurrent (or no dated records to separate them)
        _ => {
            if ratio_value > 100.0 {
                StrategicClassification::BFocused
            } else if ratio_value > 10.0 {
                StrategicClassification::BLeaning
            } else if ratio_value > 1.0 {
                StrategicClassification::BalancedB
            } else if ratio_value > 0.1 {
                StrategicClassification::BalancedA
            } else {
                StrategicClassification::AFocused
            }
        }
    }
}

// ============================================================================
// CORRELATION SCORE
// ============================================================================

const DAYS_PER_YEAR: f64 = 365.25;

/// Blend name-match quality, timeline proximity, and overlap into [0, 1].
///
/// timeline decays linearly to 0 over a 10-year gap; overlap saturates at
/// 5 years. An undefined gap or zero overlap contributes 0.
pub fn correlation_score(
    name_similarities: &[f64],
    gap_days: Option<i64>,
    overlap_days: i64,
) -> f64 {
    let name_score = if name_similarities.is_empty() {
        0.0
    } else {
        name_similarities.iter().sum::<f64>() / name_similarities.len() as f64
    };

    let timeline_score = match gap_days {
        Some(gap) => (1.0 - (gap.abs() as f64) / DAYS_PER_YEAR / 10.0).max(0.0),
        None => 0.0,
    };

    let overlap_score = ((overlap_days.max(0) as f64) / DAYS_PER_YEAR / 5.0).min(1.0);

    (0.3 * name_score + 0.4 * timeline_score + 0.3 * overlap_score).clamp(0.0, 1.0)
}

// ============================================================================
// COMPANY ANALYSIS
// ============================================================================

/// Top-level output of one cross-jurisdiction analysis request.
/// Immutable once returned; callers may cache it externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub company: String,

    pub timeline: TimelineAnalysis,
    pub financial: FinancialAnalysis,

    /// Blended correlation strength, 0.0 - 1.0
    pub correlation_score: f64,

    pub strategic_classification: StrategicClassification,

    /// How many cross-source record pairs cleared the threshold
    pub matched_pair_count: usize,

    /// Mean confidence across those pairs (0.0 when there were none)
    pub avg_name_confidence: f64,
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Caller-supplied tuning. Thresholds and the risk table are configuration,
/// not algorithm — they can change without touching the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cross-source match threshold (default 0.8)
    pub similarity_threshold: f64,

    pub risk_weights: RiskWeights,

    pub cluster: ClusterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            similarity_threshold: 0.8,
            risk_weights: RiskWeights::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// A threshold outside (0, 1] is a programming error, not a data issue —
    /// the one condition that surfaces as a hard failure.
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            bail!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            );
        }
        if !(self.cluster.threshold > 0.0 && self.cluster.threshold <= 1.0) {
            bail!(
                "cluster threshold must be in (0, 1], got {}",
                self.cluster.threshold
            );
        }
        Ok(())
    }
}

// ============================================================================
// CORRELATION ENGINE
// ============================================================================

/// The full pipeline: match, then analyze timeline + financials, then
/// classify and score. Pure computation over input snapshots — concurrent
/// analyses share nothing.
pub struct CorrelationEngine {
    config: EngineConfig,
}

impl CorrelationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(CorrelationEngine { config })
    }

    pub fn with_defaults() -> Self {
        CorrelationEngine {
            config: EngineConfig::default(),
        }
    }

    /// Cross-jurisdiction analysis for one company.
    ///
    /// `set_a` is the local jurisdiction's records, `set_b` the federal
    /// side's. Empty inputs produce a well-typed NoActivity result.
    pub fn analyze(
        &self,
        company: &str,
        set_a: &[RawRecord],
        set_b: &[RawRecord],
    ) -> CompanyAnalysis {
        let matcher = CrossSourceMatcher::with_threshold(self.config.similarity_threshold);
        let matches = matcher.find_matches(set_a, set_b);

        let all_pairs: Vec<&RecordMatch> = matches.values().flatten().collect();
        let name_similarities: Vec<f64> = all_pairs.iter().map(|m| m.confidence).collect();

        let timeline = TimelineAnalyzer::analyze(set_a, set_b);
        let financial = FinancialAnalyzer::analyze(set_a, set_b);

        let strategic_classification = classify_strategy(
            financial.ratio_b_over_a,
            timeline.gap_days,
            financial.total_a,
            financial.total_b,
        );

        let score = correlation_score(
            &name_similarities,
            timeline.gap_days,
            timeline.overlap_days,
        );

        let avg_name_confidence = if name_similarities.is_empty() {
            0.0
        } else {
            name_similarities.iter().sum::<f64>() / name_similarities.len() as f64
        };

        log::debug!(
            "analysis for {}: {} pairs, score {:.3}, {}",
            company,
            all_pairs.len(),
            score,
            strategic_classification.as_str()
        );

        CompanyAnalysis {
            company: company.to_string(),
            timeline,
            financial,
            correlation_score: score,
            strategic_classification,
            matched_pair_count: all_pairs.len(),
            avg_name_confidence,
        }
    }

    /// List-level deduplication: cluster a flat record pool's names into
    /// alias groups and build one risk-scored profile per cluster.
    pub fn resolve_entities(&self, records: &[RawRecord]) -> Vec<EntityProfile> {
        let mut records_by_name: HashMap<String, Vec<RawRecord>> = HashMap::new();
        let mut names: Vec<String> = Vec::new();

        for record in records {
            if record.name.trim().is_empty() {
                continue;
            }
            if !records_by_name.contains_key(&record.name) {
                names.push(record.name.clone());
            }
            records_by_name
                .entry(record.name.clone())
                .or_default()
                .push(record.clone());
        }

        let clusterer = EntityClusterer::new(self.config.cluster.clone());
        let clusters = clusterer.cluster(&names);

        let builder = ProfileBuilder::with_weights(self.config.risk_weights.clone());

        clusters
            .iter()
            .map(|cluster| {
                let canonical = canonical_name(cluster);
                builder.build_profile(&canonical, cluster, &records_by_name)
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
