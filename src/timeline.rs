// ⏱️ Timeline Analyzer - Activity windows, gap, and overlap per jurisdiction
// Jurisdiction A is the local/city side, jurisdiction B the federal side.
// Records without a parseable date are excluded from ranges, never zeroed.

use crate::record::RawRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// ACTIVITY PATTERN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityPattern {
    /// Activity only in jurisdiction B (federal)
    FederalOnly,

    /// Activity only in jurisdiction A (local)
    LocalOnly,

    /// B's activity began more than a year before A's
    FederalFirst,

    /// A's activity began more than a year before B's
    LocalFirst,

    /// Starts within a year of each other
    Simultaneous,

    /// No dated activity on either side
    NoActivity,
}

impl ActivityPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityPattern::FederalOnly => "Federal-Only",
            ActivityPattern::LocalOnly => "Local-Only",
            ActivityPattern::FederalFirst => "Federal-First",
            ActivityPattern::LocalFirst => "Local-First",
            ActivityPattern::Simultaneous => "Simultaneous",
            ActivityPattern::NoActivity => "No-Activity",
        }
    }
}

// ============================================================================
// TIMELINE ANALYSIS
// ============================================================================

/// Activity boundaries and their relationship across two jurisdictions.
///
/// Sign convention (applied by every consumer of this type): `gap_days =
/// b_start - a_start`. Negative means jurisdiction B's activity began BEFORE
/// jurisdiction A's; a gap below -365 classifies as FederalFirst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineAnalysis {
    pub a_start: Option<NaiveDate>,
    pub a_end: Option<NaiveDate>,
    pub b_start: Option<NaiveDate>,
    pub b_end: Option<NaiveDate>,

    /// b_start - a_start in days; None when either side has no dated records
    pub gap_days: Option<i64>,

    /// Days the two activity windows overlap; 0 when they do not overlap or
    /// when any boundary is missing
    pub overlap_days: i64,

    pub activity_pattern: ActivityPattern,
}

// ============================================================================
// TIMELINE ANALYZER
// ============================================================================

pub struct TimelineAnalyzer;

impl TimelineAnalyzer {
    /// Derive the timeline relationship between two record sets.
    pub fn analyze(set_a: &[RawRecord], set_b: &[RawRecord]) -> TimelineAnalysis {
        let (a_start, a_end) = date_range(set_a);
        let (b_start, b_end) = date_range(set_b);

        let gap_days = match (a_start, b_start) {
            (Some(a), Some(b)) => Some((b - a).num_days()),
            _ => None,
        };

        let overlap_days = match (a_start, a_end, b_start, b_end) {
            (Some(sa), Some(ea), Some(sb), Some(eb)) => {
                let overlap = (ea.min(eb) - sa.max(sb)).num_days();
                overlap.max(0)
            }
            _ => 0,
        };

        let activity_pattern = classify_pattern(a_start, b_start, gap_days);

        TimelineAnalysis {
            a_start,
            a_end,
            b_start,
            b_end,
            gap_days,
            overlap_days,
            activity_pattern,
        }
    }
}

/// Min/max of the parseable dates in a record set
fn date_range(records: &[RawRecord]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;

    for record in records {
        let Some(date) = record.parsed_date() else {
            continue;
        };
        start = Some(start.map_or(date, |s| s.min(date)));
        end = Some(end.map_or(date, |e| e.max(date)));
    }

    (start, end)
}

fn classify_pattern(
    a_start: Option<NaiveDate>,
    b_start: Option<NaiveDate>,
    gap_days: Option<i64>,
) -> ActivityPattern {
    match (a_start, b_start) {
        (None, Some(_)) => ActivityPattern::FederalOnly,
        (Some(_), None) => ActivityPattern::LocalOnly,
        (None, None) => ActivityPattern::NoActivity,
        (Some(_), Some(_)) => match gap_days {
            // B began over a year before A
            Some(gap) if gap < -365 => ActivityPattern::FederalFirst,
            // A began over a year before B
            Some(gap) if gap > 365 => ActivityPattern::LocalFirst,
            _ => ActivityPattern::Simultaneous,
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
