use serde::{Deserialize, Serialize};

use super::domain::{AppId, AppProfile, CompletenessMode, PreferenceWeights};
use super::scoring::{ScoreEngine, ScoreResult, ScoringError};

pub const MIN_COHORT_SIZE: usize = 2;
pub const MAX_COHORT_SIZE: usize = 5;

/// Score gap below which the popularity proxy decides the order. A
/// one-decimal score cannot separate candidates this close on methodology
/// alone.
pub const NEAR_TIE_WINDOW: f64 = 0.1;

/// One app queued for comparison with the completeness tier settled upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCandidate {
    pub profile: AppProfile,
    pub mode: CompletenessMode,
}

/// A scored app in ranked position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedApp {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    pub result: ScoreResult,
}

impl RankedApp {
    pub fn app_id(&self) -> &AppId {
        &self.result.app_id
    }
}

/// Ranked batch plus the winner pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub ranked: Vec<RankedApp>,
    pub winner: AppId,
}

/// Error raised for a whole comparison batch. A failing candidate fails the
/// comparison; partial rankings are never returned.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("a comparison needs at least 2 apps, got {0}")]
    InsufficientEntities(usize),
    #[error("a comparison supports at most 5 apps, got {0}")]
    TooManyEntities(usize),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Runs the engine over a candidate batch and applies the ranking rule.
pub struct ComparisonOrchestrator {
    engine: ScoreEngine,
}

impl ComparisonOrchestrator {
    pub fn new(engine: ScoreEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }

    /// Score every candidate independently, then rank. Scores never depend
    /// on other members of the batch, so candidate order does not matter.
    pub fn compare(
        &self,
        candidates: &[ComparisonCandidate],
        weights: &PreferenceWeights,
    ) -> Result<ComparisonOutcome, ComparisonError> {
        if candidates.len() < MIN_COHORT_SIZE {
            return Err(ComparisonError::InsufficientEntities(candidates.len()));
        }
        if candidates.len() > MAX_COHORT_SIZE {
            return Err(ComparisonError::TooManyEntities(candidates.len()));
        }

        let mut ranked = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let result = self
                .engine
                .score(&candidate.profile, weights, candidate.mode)?;
            ranked.push(RankedApp {
                display_name: candidate.profile.display_name.clone(),
                popularity: candidate.profile.popularity,
                result,
            });
        }

        rank_apps(&mut ranked);

        let winner = ranked
            .first()
            .map(|app| app.result.app_id.clone())
            .ok_or(ComparisonError::InsufficientEntities(0))?;

        Ok(ComparisonOutcome { ranked, winner })
    }
}

/// Sort by score descending; scores inside the near-tie window fall back to
/// the popularity proxy (higher wins). The sort is stable, so equal entries
/// keep their input order.
pub(crate) fn rank_apps(apps: &mut [RankedApp]) {
    apps.sort_by(|a, b| {
        if (a.result.score - b.result.score).abs() < NEAR_TIE_WINDOW {
            let pa = a.popularity.unwrap_or(0.0);
            let pb = b.popularity.unwrap_or(0.0);
            pb.total_cmp(&pa)
        } else {
            b.result.score.total_cmp(&a.result.score)
        }
    });
}
