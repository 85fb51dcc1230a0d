mod config;
pub(crate) mod rules;

pub use config::ScoringConfig;

use super::domain::{AppId, AppProfile, CompletenessMode, FeatureKind, PreferenceWeights};
use serde::{Deserialize, Serialize};

/// Stateless engine applying the scoring rubric to one attribute record.
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one app against the supplied weights. Pure: same inputs, same
    /// result, no side effects.
    pub fn score(
        &self,
        profile: &AppProfile,
        weights: &PreferenceWeights,
        mode: CompletenessMode,
    ) -> Result<ScoreResult, ScoringError> {
        rules::validate_weights(weights)?;

        if self.config.strict_aggregation && weights.is_all_zero() {
            return Err(ScoringError::DegenerateAggregation {
                app_id: profile.app_id.clone(),
            });
        }

        if mode == CompletenessMode::Full {
            rules::check_full_record(profile)?;
        }

        let aggregation = rules::score_profile(profile, weights, mode, &self.config);

        let score = if aggregation.weight_sum > 0.0 {
            round1(aggregation.weighted_total / aggregation.weight_sum)
                .clamp(0.0, self.config.score_ceiling)
        } else {
            match mode {
                CompletenessMode::Full => self.config.full_fallback_score,
                CompletenessMode::Partial => self.config.partial_fallback_score,
            }
        };

        Ok(ScoreResult {
            app_id: profile.app_id.clone(),
            mode,
            score,
            components: aggregation.components,
            attributes_used: aggregation.used,
            attributes_excluded: aggregation.excluded,
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Raw per-feature score and the weight that was applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub feature: FeatureKind,
    pub value: f64,
    pub weight: f64,
}

/// Outcome of scoring one app. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub app_id: AppId,
    pub mode: CompletenessMode,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
    pub attributes_used: Vec<FeatureKind>,
    pub attributes_excluded: Vec<FeatureKind>,
}

/// Error raised while scoring a single record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("app '{app_id}' is missing attributes required for a full comparison: {missing:?}")]
    IncompleteRecord {
        app_id: AppId,
        missing: Vec<FeatureKind>,
    },
    #[error("weight for {feature} must lie in 0..=10, got {value}")]
    InvalidWeight { feature: FeatureKind, value: f64 },
    #[error("all preference weights are zero for app '{app_id}'")]
    DegenerateAggregation { app_id: AppId },
}
