//! Preference-weighted comparison workflow: catalog resolution, scoring,
//! explainability, ranking, and the market metrics derived from a scored
//! batch.

pub mod catalog;
pub mod domain;
pub mod explain;
pub mod metrics;
pub mod orchestrator;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{AttributeCatalog, CatalogError, CatalogMetadata, CsvCatalog};
pub use domain::{
    AppId, AppProfile, CompletenessMode, FeatureKind, PreferenceWeights, Scenario,
    WeightAdjustment,
};
pub use explain::{explain, FeatureContribution};
pub use metrics::{
    consumer_confusion, feature_dominance, regional_dominance, scenario_rankings, ConfusionBand,
    DominanceEntry, RegionalDominance, ScenarioRanking, BASE_SCENARIO,
};
pub use orchestrator::{
    ComparisonCandidate, ComparisonError, ComparisonOrchestrator, ComparisonOutcome, RankedApp,
    MAX_COHORT_SIZE, MIN_COHORT_SIZE, NEAR_TIE_WINDOW,
};
pub use router::comparison_router;
pub use scoring::{ScoreComponent, ScoreEngine, ScoreResult, ScoringConfig, ScoringError};
pub use service::{
    AppExplanation, AppSelection, ComparisonService, ComparisonServiceError,
    ComparisonSubmission, InsightsReport, InsightsSubmission, ValidationView,
    DEFAULT_SEARCH_LIMIT,
};
