// 📄 Raw Records - Common shape for fetched disclosure data
// Payments, contracts, and lobbying filings arrive from jurisdiction-specific
// adapters already flattened into this shape. The engine never mutates them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// RAW RECORD
// ============================================================================

/// One disclosure record as produced by an external adapter.
///
/// Required fields are the minimal contract every adapter must satisfy;
/// everything source-specific lives in `extra`. Government portal data is
/// messy, so `amount` accepts either a JSON number or a string like
/// "$1,234.56" and `date` is kept as the raw string the portal returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Entity / vendor name as disclosed
    pub name: String,

    /// Source identifier, e.g. "nyc_payments", "senate_lobbying"
    pub source: String,

    /// Monetary amount (number or currency string), if disclosed
    #[serde(default)]
    pub amount: Option<Value>,

    /// Date string as the portal returned it
    #[serde(default)]
    pub date: Option<String>,

    /// Filing year, when the source reports period metadata
    #[serde(default)]
    pub year: Option<i32>,

    /// Filing period within the year, e.g. "Q1", "first_quarter"
    #[serde(default)]
    pub period: Option<String>,

    /// Source-specific fields the engine carries but does not interpret
    #[serde(default)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawRecord {
    /// Create a record with just the required fields
    pub fn new(name: &str, source: &str) -> Self {
        RawRecord {
            name: name.to_string(),
            source: source.to_string(),
            amount: None,
            date: None,
            year: None,
            period: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Amount as f64, parsed defensively.
    ///
    /// Currency symbols, commas, and surrounding whitespace are stripped;
    /// accounting-style parentheses mean negative. Anything unparsable
    /// contributes 0.0 — upstream data quality issues must degrade, never
    /// raise.
    pub fn amount_numeric(&self) -> f64 {
        match &self.amount {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_amount_str(s),
            _ => 0.0,
        }
    }

    /// Date parsed into a NaiveDate, or None if absent/unparsable.
    ///
    /// Unparsable dates are excluded from timeline ranges, not coerced.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }

    /// Period key "{year}-{quarter}" when both pieces of metadata exist.
    /// The period label is canonicalized (see `canonical_period`) so keys
    /// sort chronologically, not lexically by label spelling.
    pub fn period_key(&self) -> Option<String> {
        match (self.year, &self.period) {
            (Some(y), Some(p)) if !p.is_empty() => {
                Some(format!("{}-{}", y, canonical_period(p)))
            }
            _ => None,
        }
    }
}

/// Normalize a filing-period label to a sortable quarter tag.
///
/// Sources disagree on spelling: "Q1", "first_quarter", "1st Quarter" all
/// mean the same period and must land on the same key — and named labels
/// sort first < fourth < second < third lexically, which would scramble
/// earliest/recent ordering downstream. Labels naming no recognizable
/// quarter pass through unchanged.
pub fn canonical_period(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let quarter = if lowered.contains("first") {
        Some(1)
    } else if lowered.contains("second") {
        Some(2)
    } else if lowered.contains("third") {
        Some(3)
    } else if lowered.contains("fourth") {
        Some(4)
    } else {
        lowered
            .chars()
            .find(|c| ('1'..='4').contains(c))
            .and_then(|c| c.to_digit(10))
            .map(|d| d as i32)
    };

    match quarter {
        Some(q) => format!("Q{}", q),
        None => raw.trim().to_string(),
    }
}

// ============================================================================
// DEFENSIVE PARSING
// ============================================================================

/// Parse a monetary amount from a string like "$1,234.56" or "(500)".
/// Returns 0.0 for anything unparsable.
pub fn parse_amount_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    // Accounting convention: parentheses mean negative
    let negative = trimmed.starts_with('(') && trimmed.ends_with(')');

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let value = cleaned.parse::<f64>().unwrap_or(0.0);
    if negative {
        -value.abs()
    } else {
        value
    }
}

/// Parse date from string (supports YYYY-MM-DD, MM/DD/YYYY, and ISO
/// datetimes with a date prefix)
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Try YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    // Try MM/DD/YYYY
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    // Try ISO datetime ("2021-01-01T00:00:00...") by taking the date prefix.
    // get() rather than slicing: byte 10 may fall mid-character in strings
    // with non-ASCII separators, which must degrade to None, not panic.
    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
