use super::super::domain::{AppProfile, CompletenessMode, FeatureKind, PreferenceWeights};
use super::config::ScoringConfig;
use super::{ScoreComponent, ScoringError};

/// Accumulated raw material for one entity's score.
pub(crate) struct Aggregation {
    pub components: Vec<ScoreComponent>,
    pub used: Vec<FeatureKind>,
    pub excluded: Vec<FeatureKind>,
    pub weighted_total: f64,
    pub weight_sum: f64,
}

pub(crate) fn validate_weights(weights: &PreferenceWeights) -> Result<(), ScoringError> {
    for kind in FeatureKind::WEIGHTED {
        let value = weights.weight(kind);
        if value.is_nan() || !(0.0..=10.0).contains(&value) {
            return Err(ScoringError::InvalidWeight {
                feature: kind,
                value,
            });
        }
    }
    Ok(())
}

/// A full comparison must not silently degrade: every stored feature and a
/// service count are required up front.
pub(crate) fn check_full_record(profile: &AppProfile) -> Result<(), ScoringError> {
    let mut missing: Vec<FeatureKind> = FeatureKind::STORED
        .iter()
        .copied()
        .filter(|kind| !profile.feature_scores.contains_key(kind))
        .collect();
    if profile.services_count == 0 {
        missing.push(FeatureKind::ServiceIntegration);
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScoringError::IncompleteRecord {
            app_id: profile.app_id.clone(),
            missing,
        })
    }
}

pub(crate) fn price_score(price: f64, config: &ScoringConfig) -> f64 {
    if price == 0.0 {
        config.score_ceiling
    } else {
        (config.score_ceiling - price).max(0.0)
    }
}

pub(crate) fn rating_score(rating: f64, config: &ScoringConfig) -> f64 {
    (rating * config.rating_multiplier).clamp(0.0, config.score_ceiling)
}

pub(crate) fn service_integration_score(services_count: u8, config: &ScoringConfig) -> f64 {
    match services_count {
        0 | 1 => config.service_tier_single,
        2 => config.service_tier_double,
        3 => config.service_tier_triple,
        _ => config.service_tier_bundle,
    }
}

pub(crate) fn score_profile(
    profile: &AppProfile,
    weights: &PreferenceWeights,
    mode: CompletenessMode,
    config: &ScoringConfig,
) -> Aggregation {
    let mut aggregation = Aggregation {
        components: Vec::new(),
        used: Vec::new(),
        excluded: Vec::new(),
        weighted_total: 0.0,
        weight_sum: 0.0,
    };

    for kind in FeatureKind::WEIGHTED {
        let weight = weights.weight(kind);
        if weight == 0.0 {
            continue;
        }

        match raw_value(profile, kind, mode, config) {
            Some(value) => accumulate(&mut aggregation, kind, value, weight),
            None => aggregation.excluded.push(kind),
        }
    }

    if mode == CompletenessMode::Partial {
        // Rating borrows the performance weight in partial mode.
        let weight = weights.weight(FeatureKind::Performance);
        if weight > 0.0 {
            let value = rating_score(profile.rating, config);
            accumulate(&mut aggregation, FeatureKind::Rating, value, weight);
        }
    }

    aggregation
}

fn accumulate(aggregation: &mut Aggregation, kind: FeatureKind, value: f64, weight: f64) {
    aggregation.components.push(ScoreComponent {
        feature: kind,
        value,
        weight,
    });
    aggregation.used.push(kind);
    aggregation.weighted_total += value * weight;
    aggregation.weight_sum += weight;
}

fn raw_value(
    profile: &AppProfile,
    kind: FeatureKind,
    mode: CompletenessMode,
    config: &ScoringConfig,
) -> Option<f64> {
    match kind {
        FeatureKind::Price => Some(price_score(profile.price, config)),
        FeatureKind::ServiceIntegration => match mode {
            CompletenessMode::Full => Some(service_integration_score(
                profile.services_count,
                config,
            )),
            CompletenessMode::Partial => None,
        },
        FeatureKind::Privacy
        | FeatureKind::Performance
        | FeatureKind::EaseOfUse
        | FeatureKind::FeatureRichness
        | FeatureKind::Customization
        | FeatureKind::SupportQuality => match mode {
            CompletenessMode::Full => match profile.feature_scores.get(&kind) {
                Some(Some(value)) => Some(*value),
                Some(None) => Some(config.neutral_feature_score),
                None => None,
            },
            CompletenessMode::Partial => None,
        },
        // Scored through the partial-mode rating path, never through a weight
        // slot of its own.
        FeatureKind::Rating => None,
    }
}
