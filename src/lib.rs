// Disclosure Correlation Engine - Core Library
// Entity resolution and cross-jurisdictional correlation over government
// disclosure records (payments, contracts, lobbying filings).
//
// The engine consumes already-fetched record lists and produces entity
// profiles and correlation analyses. Fetching, caching, persistence, and the
// API surface live in external layers.

pub mod record;
pub mod normalize;
pub mod similarity;
pub mod clustering;
pub mod profile;
pub mod matching;
pub mod timeline;
pub mod financial;
pub mod analysis;

// Re-export commonly used types
pub use record::{canonical_period, parse_amount_str, parse_date, RawRecord};
pub use normalize::{normalize, NormalizerCache};
pub use similarity::{similarity, similarity_normalized};
pub use clustering::{
    canonical_name, ClusterAlgorithm, ClusterConfig, EntityClusterer, EntityMatch, MatchType,
};
pub use profile::{
    classify_entity_type, EntityProfile, EntityType, ProfileBuilder, RiskWeights,
};
pub use matching::{CrossSourceMatcher, RecordMatch};
pub use timeline::{ActivityPattern, TimelineAnalysis, TimelineAnalyzer};
pub use financial::{
    classify_trend, AmountRatio, FinancialAnalysis, FinancialAnalyzer, SpendingTrend,
};
pub use analysis::{
    classify_strategy, correlation_score, CompanyAnalysis, CorrelationEngine, EngineConfig,
    StrategicClassification,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
