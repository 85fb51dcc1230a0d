use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::{normalize_name, AttributeCatalog, CatalogError, CatalogMetadata};
use super::domain::{
    AppId, AppProfile, CompletenessMode, PreferenceWeights, Scenario,
};
use super::explain::{explain, FeatureContribution};
use super::metrics::{
    consumer_confusion, feature_dominance, regional_dominance, scenario_rankings, ConfusionBand,
    DominanceEntry, RegionalDominance, ScenarioRanking,
};
use super::orchestrator::{
    ComparisonCandidate, ComparisonError, ComparisonOrchestrator, ComparisonOutcome,
};
use super::scoring::{ScoreEngine, ScoringConfig};

/// Rating assumed for an app living outside the catalog: a middling public
/// reputation, scored from price and rating alone.
const EXTERNAL_APP_RATING: f64 = 3.5;

/// Default number of rows returned by a catalog search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// One requested app plus the completeness tier the caller settled on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSelection {
    pub name: String,
    pub mode: CompletenessMode,
}

/// Payload for a plain ranked comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSubmission {
    pub apps: Vec<AppSelection>,
    pub preferences: PreferenceWeights,
}

/// Payload for the full market-insight view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSubmission {
    pub apps: Vec<AppSelection>,
    pub preferences: PreferenceWeights,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// Whether a name resolves to a complete catalog record, and the
/// completeness tier a comparison of it should run under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationView {
    pub exists_in_catalog: bool,
    pub comparison_mode: CompletenessMode,
}

/// Score plus contribution table for one app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppExplanation {
    pub app_id: AppId,
    pub display_name: String,
    pub score: f64,
    pub breakdown: Vec<FeatureContribution>,
}

/// Everything the insights endpoint reports for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub fdi: Vec<DominanceEntry>,
    pub consumer_confusion: f64,
    pub confusion_band: ConfusionBand,
    pub scenarios: Vec<ScenarioRanking>,
    pub explainability: Vec<AppExplanation>,
    pub regional: Vec<RegionalDominance>,
}

/// Error raised by the comparison service.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonServiceError {
    #[error("'{0}' is not available for a full comparison")]
    UnknownFullApp(String),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Service composing the attribute catalog, scoring engine, and market
/// metrics behind one facade.
pub struct ComparisonService<C> {
    catalog: Arc<C>,
    orchestrator: ComparisonOrchestrator,
}

impl<C> ComparisonService<C>
where
    C: AttributeCatalog + 'static,
{
    pub fn new(catalog: Arc<C>, config: ScoringConfig) -> Self {
        Self {
            catalog,
            orchestrator: ComparisonOrchestrator::new(ScoreEngine::new(config)),
        }
    }

    /// Decide which completeness tier a named app can support. The catalog
    /// is the sole authority; anything without a complete record compares
    /// from public attributes only.
    pub fn validate(&self, name: &str) -> Result<ValidationView, ComparisonServiceError> {
        let resolved = self.catalog.resolve(name)?;
        let exists = resolved.is_some();
        let mode = match resolved {
            Some(profile) if profile.has_complete_record() => CompletenessMode::Full,
            _ => CompletenessMode::Partial,
        };
        info!(app = name, exists, mode = mode.label(), "validated app");
        Ok(ValidationView {
            exists_in_catalog: exists,
            comparison_mode: mode,
        })
    }

    pub fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AppProfile>, ComparisonServiceError> {
        let results = self.catalog.search(query, category, limit)?;
        info!(query, results = results.len(), "catalog search");
        Ok(results)
    }

    pub fn metadata(&self) -> Result<CatalogMetadata, ComparisonServiceError> {
        Ok(self.catalog.metadata()?)
    }

    /// Rank the requested apps under the caller's weights.
    pub fn compare(
        &self,
        submission: &ComparisonSubmission,
    ) -> Result<ComparisonOutcome, ComparisonServiceError> {
        info!(apps = submission.apps.len(), "comparison requested");
        let candidates = self.candidates(&submission.apps)?;
        let outcome = self
            .orchestrator
            .compare(&candidates, &submission.preferences)?;
        info!(winner = %outcome.winner, "comparison ranked");
        Ok(outcome)
    }

    /// Full market view: base ranking, per-app explainability, dominance,
    /// confusion, scenarios, and the regional breakdown, all derived from
    /// one resolved batch.
    pub fn insights(
        &self,
        submission: &InsightsSubmission,
    ) -> Result<InsightsReport, ComparisonServiceError> {
        info!(
            apps = submission.apps.len(),
            scenarios = submission.scenarios.len(),
            "insights requested"
        );

        let candidates = self.candidates(&submission.apps)?;
        let config = self.orchestrator.engine().config();
        let profiles: Vec<AppProfile> = candidates
            .iter()
            .map(|candidate| candidate.profile.clone())
            .collect();

        let fdi = feature_dominance(&profiles, &submission.preferences, config);
        let ccs = consumer_confusion(&profiles, config);
        let scenarios = scenario_rankings(
            &self.orchestrator,
            &candidates,
            &submission.preferences,
            &submission.scenarios,
        )?;

        let mut explainability = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let result = self
                .orchestrator
                .engine()
                .score(
                    &candidate.profile,
                    &submission.preferences,
                    candidate.mode,
                )
                .map_err(ComparisonError::from)?;
            explainability.push(AppExplanation {
                app_id: result.app_id.clone(),
                display_name: candidate.profile.display_name.clone(),
                score: result.score,
                breakdown: explain(&result),
            });
        }

        let regional = regional_dominance(&profiles, &submission.preferences, config);

        Ok(InsightsReport {
            fdi,
            consumer_confusion: ccs,
            confusion_band: ConfusionBand::for_score(ccs),
            scenarios,
            explainability,
            regional,
        })
    }

    fn candidates(
        &self,
        selections: &[AppSelection],
    ) -> Result<Vec<ComparisonCandidate>, ComparisonServiceError> {
        let mut candidates = Vec::with_capacity(selections.len());
        for selection in selections {
            let resolved = self.catalog.resolve(&selection.name)?;
            let profile = match (selection.mode, resolved) {
                (_, Some(profile)) => profile,
                (CompletenessMode::Full, None) => {
                    warn!(app = %selection.name, "full comparison requested for unknown app");
                    return Err(ComparisonServiceError::UnknownFullApp(
                        selection.name.clone(),
                    ));
                }
                (CompletenessMode::Partial, None) => {
                    warn!(app = %selection.name, "external app compared from public attributes");
                    external_placeholder_profile(&selection.name)
                }
            };
            candidates.push(ComparisonCandidate {
                profile,
                mode: selection.mode,
            });
        }
        Ok(candidates)
    }
}

/// Minimal public record for an app outside the catalog: free until known
/// otherwise, with a middling store rating and no feature measurements.
fn external_placeholder_profile(name: &str) -> AppProfile {
    AppProfile {
        app_id: AppId(normalize_name(name)),
        display_name: name.trim().to_string(),
        category: None,
        price: 0.0,
        rating: EXTERNAL_APP_RATING,
        services_count: 1,
        popularity: None,
        region: None,
        feature_scores: BTreeMap::new(),
    }
}
