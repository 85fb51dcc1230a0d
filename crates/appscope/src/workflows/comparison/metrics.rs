use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AppId, AppProfile, FeatureKind, PreferenceWeights, Scenario};
use super::orchestrator::{
    ComparisonCandidate, ComparisonError, ComparisonOrchestrator, RankedApp,
};
use super::scoring::{rules, ScoringConfig};

/// Name given to the caller's own weights when they run as the first
/// scenario.
pub const BASE_SCENARIO: &str = "BaseUserInput";

/// Feature columns participating in dominance and confusion statistics.
/// Price stays out: dominance is about differentiated capability, not cost.
const METRIC_COLUMNS: [FeatureKind; 8] = [
    FeatureKind::Rating,
    FeatureKind::FeatureRichness,
    FeatureKind::EaseOfUse,
    FeatureKind::Performance,
    FeatureKind::Customization,
    FeatureKind::SupportQuality,
    FeatureKind::Privacy,
    FeatureKind::ServiceIntegration,
];

/// Weight applied to columns without a caller-supplied slot (rating).
const DEFAULT_COLUMN_WEIGHT: f64 = 1.0;

/// How dominant one app is on the differentiated features within this batch.
/// Relative to the batch only, not an absolute quality measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceEntry {
    pub app_id: AppId,
    pub display_name: String,
    pub dominance_index: f64,
}

/// Interpretation band for the consumer confusion score. Lower bounds are
/// inclusive: `< 0.5` low, `[0.5, 1.0)` moderate, `>= 1.0` high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfusionBand {
    Low,
    Moderate,
    High,
}

impl ConfusionBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 1.0 {
            ConfusionBand::High
        } else if score >= 0.5 {
            ConfusionBand::Moderate
        } else {
            ConfusionBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfusionBand::Low => "low",
            ConfusionBand::Moderate => "moderate",
            ConfusionBand::High => "high",
        }
    }
}

/// Ranking produced by one named weight profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRanking {
    pub name: String,
    pub ranked: Vec<RankedApp>,
}

/// Per-region dominance view. Apps without a region tag are left out
/// entirely rather than pooled into a synthetic bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalDominance {
    pub region: String,
    pub count: usize,
    pub dominance: Vec<DominanceEntry>,
}

/// Feature Dominance Index: min-max normalize each profile's raw feature
/// values against the batch, then weight-average with the caller's
/// preferences. A feature the whole batch shares at one value normalizes to
/// zero, so only differentiated features move the index.
pub fn feature_dominance(
    profiles: &[AppProfile],
    weights: &PreferenceWeights,
    config: &ScoringConfig,
) -> Vec<DominanceEntry> {
    if profiles.is_empty() {
        return Vec::new();
    }

    struct Column {
        kind: FeatureKind,
        min: f64,
        max: f64,
        weight: f64,
    }

    let mut columns = Vec::new();
    for kind in METRIC_COLUMNS {
        let values: Vec<f64> = profiles
            .iter()
            .filter_map(|profile| column_value(profile, kind, config))
            .collect();
        if values.is_empty() {
            continue;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        columns.push(Column {
            kind,
            min,
            max,
            weight: column_weight(weights, kind),
        });
    }

    if columns.is_empty() {
        return Vec::new();
    }

    let weight_sum: f64 = columns.iter().map(|column| column.weight).sum();
    let denominator = if weight_sum > 0.0 {
        weight_sum
    } else {
        columns.len() as f64
    };

    profiles
        .iter()
        .map(|profile| {
            let mut weighted = 0.0;
            for column in &columns {
                let Some(value) = column_value(profile, column.kind, config) else {
                    continue;
                };
                let range = match column.max - column.min {
                    r if r == 0.0 => 1.0,
                    r => r,
                };
                weighted += (value - column.min) / range * column.weight;
            }
            DominanceEntry {
                app_id: profile.app_id.clone(),
                display_name: profile.display_name.clone(),
                dominance_index: round4(weighted / denominator),
            }
        })
        .collect()
}

/// Consumer Confusion Score: grows with batch size and with how tightly the
/// feature vectors cluster. `(1 + ln(1 + n)) * (1 - mean(variance / range^2))`
/// over the metric columns, population variance, zero ranges treated as 1.
pub fn consumer_confusion(profiles: &[AppProfile], config: &ScoringConfig) -> f64 {
    if profiles.len() < 2 {
        return 0.0;
    }

    let mut normalized_variances = Vec::new();
    for kind in METRIC_COLUMNS {
        let values: Vec<f64> = profiles
            .iter()
            .filter_map(|profile| column_value(profile, kind, config))
            .collect();
        if values.len() < 2 {
            continue;
        }

        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = match max - min {
            r if r == 0.0 => 1.0,
            r => r,
        };
        normalized_variances.push((variance / (range * range)).max(0.0));
    }

    if normalized_variances.is_empty() {
        return 0.0;
    }

    let similarity =
        1.0 - normalized_variances.iter().sum::<f64>() / normalized_variances.len() as f64;
    let confusion = (1.0 + (1.0 + profiles.len() as f64).ln()) * similarity;
    round4(confusion)
}

/// Re-rank the same batch under the base weights and each named scenario.
/// The base run comes first; no run mutates another.
pub fn scenario_rankings(
    orchestrator: &ComparisonOrchestrator,
    candidates: &[ComparisonCandidate],
    base: &PreferenceWeights,
    scenarios: &[Scenario],
) -> Result<Vec<ScenarioRanking>, ComparisonError> {
    let mut runs = Vec::with_capacity(scenarios.len() + 1);

    let outcome = orchestrator.compare(candidates, base)?;
    runs.push(ScenarioRanking {
        name: BASE_SCENARIO.to_string(),
        ranked: outcome.ranked,
    });

    for scenario in scenarios {
        let weights = scenario.weights(base);
        let outcome = orchestrator.compare(candidates, &weights)?;
        runs.push(ScenarioRanking {
            name: scenario.name.clone(),
            ranked: outcome.ranked,
        });
    }

    Ok(runs)
}

/// Group the batch by region tag and rank each group's dominance indices.
pub fn regional_dominance(
    profiles: &[AppProfile],
    weights: &PreferenceWeights,
    config: &ScoringConfig,
) -> Vec<RegionalDominance> {
    let mut groups: BTreeMap<String, Vec<AppProfile>> = BTreeMap::new();
    for profile in profiles {
        if let Some(region) = &profile.region {
            groups.entry(region.clone()).or_default().push(profile.clone());
        }
    }

    groups
        .into_iter()
        .map(|(region, members)| {
            let mut dominance = feature_dominance(&members, weights, config);
            dominance.sort_by(|a, b| {
                b.dominance_index
                    .total_cmp(&a.dominance_index)
                    .then_with(|| a.app_id.0.cmp(&b.app_id.0))
            });
            RegionalDominance {
                region,
                count: members.len(),
                dominance,
            }
        })
        .collect()
}

fn column_value(profile: &AppProfile, kind: FeatureKind, config: &ScoringConfig) -> Option<f64> {
    match kind {
        FeatureKind::Rating => Some(profile.rating),
        FeatureKind::ServiceIntegration => (profile.services_count > 0)
            .then(|| rules::service_integration_score(profile.services_count, config)),
        _ => match profile.feature_scores.get(&kind) {
            Some(Some(value)) => Some(*value),
            Some(None) => Some(config.neutral_feature_score),
            None => None,
        },
    }
}

fn column_weight(weights: &PreferenceWeights, kind: FeatureKind) -> f64 {
    match kind {
        FeatureKind::Rating => DEFAULT_COLUMN_WEIGHT,
        _ => weights.weight(kind),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
