use serde::{Deserialize, Serialize};

/// Policy constants for the scoring rubric.
///
/// The fallback scores are intentionally asymmetric: an aggregation with no
/// usable weight yields `full_fallback_score` for a full record (nothing
/// could be evaluated, which points at a misconfigured request) and
/// `partial_fallback_score` for a partial record (no usable signal should not
/// read as a bad app). `strict_aggregation` turns an all-zero weight vector
/// into an error instead of either fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Score used when a feature is declared on the record but unmeasured.
    pub neutral_feature_score: f64,
    pub full_fallback_score: f64,
    pub partial_fallback_score: f64,
    /// Ratings arrive on a 0-5 scale; this lifts them onto the score scale.
    pub rating_multiplier: f64,
    pub score_ceiling: f64,
    /// Service-integration tiers keyed by the count of bundled services.
    /// The jumps are steps, not an interpolated curve.
    pub service_tier_single: f64,
    pub service_tier_double: f64,
    pub service_tier_triple: f64,
    pub service_tier_bundle: f64,
    pub strict_aggregation: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            neutral_feature_score: 5.0,
            full_fallback_score: 0.0,
            partial_fallback_score: 5.0,
            rating_multiplier: 2.0,
            score_ceiling: 10.0,
            service_tier_single: 5.0,
            service_tier_double: 7.0,
            service_tier_triple: 8.5,
            service_tier_bundle: 10.0,
            strict_aggregation: false,
        }
    }
}
