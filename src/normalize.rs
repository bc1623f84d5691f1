// 🔤 Name Normalizer - Canonical form for entity name comparison
// "The Google Client Services, LLC" and "GOOGLE CLIENT SERVICES" must
// normalize to the same string before any similarity scoring happens.

use std::collections::HashMap;

/// Corporate-entity suffixes stripped from the END of a name only.
/// Mid-string occurrences are legitimate ("Corporation Counsel Office").
const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "corp",
    "corporation",
    "company",
    "co",
    "ltd",
    "limited",
    "llc",
    "lp",
    "llp",
    "pllc",
    "pc",
    "pa",
    "group",
    "holdings",
    "enterprises",
    "international",
    "intl",
    "global",
    "worldwide",
];

/// Articles dropped when they are the first token
const LEADING_NOISE: &[&str] = &["the", "a", "an"];

/// Whether a token is one of the corporate-entity suffixes
/// (used by entity-type classification as well as normalization)
pub fn is_corporate_suffix(token: &str) -> bool {
    CORPORATE_SUFFIXES.contains(&token.to_lowercase().as_str())
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize a raw entity name for comparison.
///
/// Steps: lowercase; punctuation stripped except internal hyphens, with
/// ampersand rewritten to "and"; whitespace collapsed; a leading article
/// dropped; trailing corporate suffixes dropped (repeatedly, so
/// "X Holdings LLC" loses both). Empty input normalizes to "".
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let lowered = raw.to_lowercase().replace('&', " and ");

    // Keep alphanumerics and hyphens; everything else becomes a separator
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = stripped.split_whitespace().collect();

    // Drop a leading article, but never down to nothing
    if tokens.len() > 1 && LEADING_NOISE.contains(&tokens[0]) {
        tokens.remove(0);
    }

    // Drop trailing corporate suffixes, keeping at least one token
    while tokens.len() > 1 && CORPORATE_SUFFIXES.contains(tokens.last().unwrap_or(&"")) {
        tokens.pop();
    }

    tokens.join(" ")
}

// ============================================================================
// PER-CALL CACHE
// ============================================================================

/// Memoizes name → normalized-name within one analysis invocation.
///
/// The input alphabet is unbounded but repeats heavily within a request, so
/// callers hold one of these for the duration of a match/cluster pass and
/// drop it with the invocation. Never shared across requests.
#[derive(Debug, Default)]
pub struct NormalizerCache {
    entries: HashMap<String, String>,
}

impl NormalizerCache {
    pub fn new() -> Self {
        NormalizerCache {
            entries: HashMap::new(),
        }
    }

    /// Normalize through the cache
    pub fn normalize(&mut self, raw: &str) -> String {
        if let Some(cached) = self.entries.get(raw) {
            return cached.clone();
        }
        let normalized = normalize(raw);
        self.entries.insert(raw.to_string(), normalized.clone());
        normalized
    }

    /// Number of distinct raw names seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
