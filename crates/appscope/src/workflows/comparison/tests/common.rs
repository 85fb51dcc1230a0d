use std::collections::BTreeMap;
use std::sync::Arc;

use crate::workflows::comparison::catalog::CsvCatalog;
use crate::workflows::comparison::domain::{
    AppId, AppProfile, CompletenessMode, FeatureKind, PreferenceWeights,
};
use crate::workflows::comparison::orchestrator::{ComparisonCandidate, ComparisonOrchestrator};
use crate::workflows::comparison::scoring::{ScoreEngine, ScoringConfig};
use crate::workflows::comparison::service::ComparisonService;

pub(super) const CATALOG_FIXTURE: &str = "\
app_name,category,region,price,rating,downloads,services_count,privacy_score,performance_score,ease_of_use_score,feature_richness_score,customization_score,support_quality_score
ChatterBox,Communication,Global,0,4.5,5000000,4,8.0,8.5,9.0,8.0,6.5,7.0
NoteNest,Productivity,EU,4.5,4.2,1200000,2,7.0,7.5,8.0,9.0,8.5,6.0
PixelPad,Productivity,EU,2.0,3.9,800000,1,6.0,7.0,7.5,6.5,7.0,5.5
GhostWire,Communication,US,0,4.8,300000,3,9.5,8.0,6.5,5.5,4.0,
";

pub(super) fn engine() -> ScoreEngine {
    ScoreEngine::new(ScoringConfig::default())
}

pub(super) fn orchestrator() -> ComparisonOrchestrator {
    ComparisonOrchestrator::new(engine())
}

pub(super) fn catalog() -> CsvCatalog {
    CsvCatalog::from_reader(CATALOG_FIXTURE.as_bytes()).expect("fixture parses")
}

pub(super) fn service() -> ComparisonService<CsvCatalog> {
    ComparisonService::new(Arc::new(catalog()), ScoringConfig::default())
}

/// A complete record with every stored feature at `feature_value`.
pub(super) fn full_profile(
    name: &str,
    price: f64,
    services_count: u8,
    feature_value: f64,
) -> AppProfile {
    let feature_scores: BTreeMap<FeatureKind, Option<f64>> = FeatureKind::STORED
        .iter()
        .map(|kind| (*kind, Some(feature_value)))
        .collect();

    AppProfile {
        app_id: AppId(name.to_lowercase()),
        display_name: name.to_string(),
        category: None,
        price,
        rating: 4.0,
        services_count,
        popularity: None,
        region: None,
        feature_scores,
    }
}

pub(super) fn full_candidate(profile: AppProfile) -> ComparisonCandidate {
    ComparisonCandidate {
        profile,
        mode: CompletenessMode::Full,
    }
}

pub(super) fn price_only_weights(weight: f64) -> PreferenceWeights {
    PreferenceWeights {
        price: weight,
        ..PreferenceWeights::default()
    }
}
