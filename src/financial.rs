// 💰 Financial Analyzer - Totals, ratios, and quarterly trends
// The B/A ratio is an explicit sentinel when jurisdiction A's total is zero;
// nothing downstream ever divides unguarded.

use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// AMOUNT RATIO
// ============================================================================

/// Ratio of jurisdiction-B spend over jurisdiction-A spend.
///
/// `Undefined` whenever A's total is zero — callers must branch on it
/// before formatting or comparing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AmountRatio {
    Defined(f64),
    Undefined,
}

impl AmountRatio {
    pub fn compute(total_a: f64, total_b: f64) -> Self {
        if total_a > 0.0 {
            AmountRatio::Defined(total_b / total_a)
        } else {
            AmountRatio::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            AmountRatio::Defined(v) => Some(*v),
            AmountRatio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, AmountRatio::Undefined)
    }
}

// ============================================================================
// SPENDING TREND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendingTrend {
    StronglyIncreasing,
    ModeratelyIncreasing,
    Stable,
    ModeratelyDecreasing,
    StronglyDecreasing,

    /// Fewer than 3 periods of data — the analyzer does not guess
    InsufficientData,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingTrend::StronglyIncreasing => "strongly increasing",
            SpendingTrend::ModeratelyIncreasing => "moderately increasing",
            SpendingTrend::Stable => "stable",
            SpendingTrend::ModeratelyDecreasing => "moderately decreasing",
            SpendingTrend::StronglyDecreasing => "strongly decreasing",
            SpendingTrend::InsufficientData => "insufficient data",
        }
    }
}

// ============================================================================
// FINANCIAL ANALYSIS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    /// Jurisdiction A (local) total
    pub total_a: f64,

    /// Jurisdiction B (federal) total
    pub total_b: f64,

    pub ratio_b_over_a: AmountRatio,

    /// Per-period totals keyed "{year}-{period}", ordered by key.
    /// Records without year+period metadata are excluded here (their
    /// amounts still count toward the jurisdiction totals).
    pub quarterly_breakdown: BTreeMap<String, f64>,

    /// Period with the highest total, if any period data exists
    pub peak_period: Option<String>,

    pub trend: SpendingTrend,
}

// ============================================================================
// FINANCIAL ANALYZER
// ============================================================================

pub struct FinancialAnalyzer;

impl FinancialAnalyzer {
    /// Aggregate amounts per jurisdiction and per filing period.
    pub fn analyze(set_a: &[RawRecord], set_b: &[RawRecord]) -> FinancialAnalysis {
        let total_a: f64 = set_a.iter().map(|r| r.amount_numeric()).sum();
        let total_b: f64 = set_b.iter().map(|r| r.amount_numeric()).sum();

        let mut quarterly_breakdown: BTreeMap<String, f64> = BTreeMap::new();
        for record in set_a.iter().chain(set_b.iter()) {
            if let Some(key) = record.period_key() {
                *quarterly_breakdown.entry(key).or_insert(0.0) += record.amount_numeric();
            }
        }

        let peak_period = quarterly_breakdown
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, _)| k.clone());

        let period_totals: Vec<f64> = quarterly_breakdown.values().copied().collect();
        let trend = classify_trend(&period_totals);

        FinancialAnalysis {
            total_a,
            total_b,
            ratio_b_over_a: AmountRatio::compute(total_a, total_b),
            quarterly_breakdown,
            peak_period,
            trend,
        }
    }
}

/// Trend over period totals in chronological order: mean of the most recent
/// 3 periods against the mean of the earliest 3.
pub fn classify_trend(period_totals: &[f64]) -> SpendingTrend {
    if period_totals.len() < 3 {
        return SpendingTrend::InsufficientData;
    }

    let earliest: f64 = period_totals[..3].iter().sum::<f64>() / 3.0;
    let recent: f64 = period_totals[period_totals.len() - 3..].iter().sum::<f64>() / 3.0;

    if earliest <= 0.0 {
        // No early baseline to divide by
        return if recent > 0.0 {
            SpendingTrend::StronglyIncreasing
        } else {
            SpendingTrend::Stable
        };
    }

    let ratio = recent / earliest;
    if ratio > 1.5 {
        SpendingTrend::StronglyIncreasing
    } else if ratio > 1.1 {
        SpendingTrend::ModeratelyIncreasing
    } else if ratio < 0.5 {
        SpendingTrend::StronglyDecreasing
    } else if ratio < 0.9 {
        SpendingTrend::ModeratelyDecreasing
    } else {
        SpendingTrend::Stable
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(amount: f64, year: i32, period: &str) -> RawRecord {
        let mut r = RawRecord::new("Acme Inc", "senate_lobbying");
        r.amount = Some(json!(amount));
        r.year = Some(year);
        r.period = Some(period.to_string());
        r
    }

    fn plain(amount: f64) -> RawRecord {
        let mut r = RawRecord::new("Acme Inc", "nyc_payments");
        r.amount = Some(json!(amount));
        r
    }

    #[test]
    fn test_totals_and_ratio() {
        let set_a = vec![plain(100_000.0)];
        let set_b = vec![plain(2_000_000.0)];

        let analysis = FinancialAnalyzer::analyze(&set_a, &set_b);

        assert_eq!(analysis.total_a, 100_000.0);
        assert_eq!(analysis.total_b, 2_000_000.0);
        assert_eq!(analysis.ratio_b_over_a, AmountRatio::Defined(20.0));
    }

    #[test]
    fn test_ratio_sentinel_when_a_is_zero() {
        let analysis = FinancialAnalyzer::analyze(&[], &[plain(500.0)]);

        assert!(analysis.ratio_b_over_a.is_undefined());
        assert_eq!(analysis.ratio_b_over_a.value(), None);
    }

    #[test]
    fn test_quarterly_breakdown_ordered() {
        let set_b = vec![
            record(500.0, 2021, "Q2"),
            record(100.0, 2020, "Q4"),
            record(300.0, 2021, "Q1"),
        ];
        let analysis = FinancialAnalyzer::analyze(&[], &set_b);

        let keys: Vec<&String> = analysis.quarterly_breakdown.keys().collect();
        assert_eq!(keys, vec!["2020-Q4", "2021-Q1", "2021-Q2"]);
    }

    #[test]
    fn test_same_period_amounts_summed() {
        let set_b = vec![record(100.0, 2021, "Q1"), record(250.0, 2021, "Q1")];
        let analysis = FinancialAnalyzer::analyze(&[], &set_b);

        assert_eq!(analysis.quarterly_breakdown["2021-Q1"], 350.0);
    }

    #[test]
    fn test_peak_period() {
        let set_b = vec![
            record(100.0, 2020, "Q1"),
            record(900.0, 2020, "Q2"),
            record(300.0, 2020, "Q3"),
        ];
        let analysis = FinancialAnalyzer::analyze(&[], &set_b);
        assert_eq!(analysis.peak_period, Some("2020-Q2".to_string()));
    }

    #[test]
    fn test_trend_strongly_increasing() {
        // Recent-3 mean ~510 vs earliest-3 mean ~105, ratio ~4.86
        let totals = [100.0, 110.0, 105.0, 500.0, 520.0, 510.0];
        assert_eq!(classify_trend(&totals), SpendingTrend::StronglyIncreasing);
    }

    #[test]
    fn test_trend_bands() {
        assert_eq!(
            classify_trend(&[100.0, 100.0, 100.0, 120.0, 120.0, 120.0]),
            SpendingTrend::ModeratelyIncreasing
        );
        assert_eq!(
            classify_trend(&[100.0, 100.0, 100.0, 100.0, 100.0, 100.0]),
            SpendingTrend::Stable
        );
        assert_eq!(
            classify_trend(&[100.0, 100.0, 100.0, 80.0, 80.0, 80.0]),
            SpendingTrend::ModeratelyDecreasing
        );
        assert_eq!(
            classify_trend(&[100.0, 100.0, 100.0, 20.0, 20.0, 20.0]),
            SpendingTrend::StronglyDecreasing
        );
    }

    #[test]
    fn test_named_quarter_labels_order_chronologically() {
        // Lexical order of the raw labels would be
        // first < fourth < second < third; the canonicalized keys must
        // restore chronological order or the trend means are wrong
        let set_b = vec![
            record(100.0, 2020, "first_quarter"),
            record(110.0, 2020, "second_quarter"),
            record(105.0, 2020, "third_quarter"),
            record(500.0, 2020, "fourth_quarter"),
            record(520.0, 2021, "first_quarter"),
            record(510.0, 2021, "second_quarter"),
        ];
        let analysis = FinancialAnalyzer::analyze(&[], &set_b);

        let keys: Vec<&String> = analysis.quarterly_breakdown.keys().collect();
        assert_eq!(
            keys,
            vec![
                "2020-Q1", "2020-Q2", "2020-Q3", "2020-Q4", "2021-Q1", "2021-Q2"
            ]
        );
        // Earliest-3 mean ~105 vs recent-3 mean ~510
        assert_eq!(analysis.trend, SpendingTrend::StronglyIncreasing);
    }

    #[test]
    fn test_mixed_label_spellings_share_a_key() {
        let set_b = vec![record(100.0, 2021, "Q1"), record(250.0, 2021, "first_quarter")];
        let analysis = FinancialAnalyzer::analyze(&[], &set_b);
        assert_eq!(analysis.quarterly_breakdown["2021-Q1"], 350.0);
    }

    #[test]
    fn test_trend_insufficient_data() {
        assert_eq!(classify_trend(&[]), SpendingTrend::InsufficientData);
        assert_eq!(classify_trend(&[100.0, 200.0]), SpendingTrend::InsufficientData);
    }

    #[test]
    fn test_trend_zero_baseline() {
        assert_eq!(
            classify_trend(&[0.0, 0.0, 0.0, 100.0, 100.0, 100.0]),
            SpendingTrend::StronglyIncreasing
        );
        assert_eq!(
            classify_trend(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            SpendingTrend::Stable
        );
    }

    #[test]
    fn test_unparsable_amounts_degrade_to_zero() {
        let mut bad = RawRecord::new("Acme Inc", "nyc_payments");
        bad.amount = Some(json!("confidential"));

        let analysis = FinancialAnalyzer::analyze(&[bad], &[plain(500.0)]);
        assert_eq!(analysis.total_a, 0.0);
        assert!(analysis.ratio_b_over_a.is_undefined());
    }
}
