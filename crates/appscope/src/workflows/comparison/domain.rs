use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog entries and score results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppId(pub String);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completeness tier of an app's attribute record, fixed before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletenessMode {
    Full,
    Partial,
}

impl CompletenessMode {
    pub fn label(&self) -> &'static str {
        match self {
            CompletenessMode::Full => "FULL",
            CompletenessMode::Partial => "PARTIAL",
        }
    }
}

/// The scoreable attributes of a compared app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKind {
    Price,
    Rating,
    Privacy,
    Performance,
    EaseOfUse,
    FeatureRichness,
    Customization,
    SupportQuality,
    ServiceIntegration,
}

impl FeatureKind {
    /// Features carrying a caller-supplied weight. Rating is scored through
    /// the performance weight in partial mode and has no slot of its own.
    pub const WEIGHTED: [FeatureKind; 8] = [
        FeatureKind::Price,
        FeatureKind::Privacy,
        FeatureKind::Performance,
        FeatureKind::EaseOfUse,
        FeatureKind::FeatureRichness,
        FeatureKind::Customization,
        FeatureKind::SupportQuality,
        FeatureKind::ServiceIntegration,
    ];

    /// Features persisted on a full catalog record.
    pub const STORED: [FeatureKind; 6] = [
        FeatureKind::Privacy,
        FeatureKind::Performance,
        FeatureKind::EaseOfUse,
        FeatureKind::FeatureRichness,
        FeatureKind::Customization,
        FeatureKind::SupportQuality,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::Price => "price",
            FeatureKind::Rating => "rating",
            FeatureKind::Privacy => "privacy",
            FeatureKind::Performance => "performance",
            FeatureKind::EaseOfUse => "easeOfUse",
            FeatureKind::FeatureRichness => "featureRichness",
            FeatureKind::Customization => "customization",
            FeatureKind::SupportQuality => "supportQuality",
            FeatureKind::ServiceIntegration => "serviceIntegration",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fully materialized attribute record for one app.
///
/// A key absent from `feature_scores` means the feature is unavailable for
/// this app; a key present with `None` means the catalog declares the feature
/// but holds no measurement, which scores at the neutral default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppProfile {
    pub app_id: AppId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: f64,
    pub rating: f64,
    pub services_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub feature_scores: BTreeMap<FeatureKind, Option<f64>>,
}

impl AppProfile {
    /// Whether the record carries everything a full comparison requires.
    pub fn has_complete_record(&self) -> bool {
        self.services_count > 0
            && FeatureKind::STORED
                .iter()
                .all(|kind| self.feature_scores.contains_key(kind))
    }
}

/// Importance weights supplied per comparison request, one slot per weighted
/// feature, each in `0..=10`. Zero removes a feature from scoring entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceWeights {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub privacy: f64,
    #[serde(default)]
    pub performance: f64,
    #[serde(default)]
    pub ease_of_use: f64,
    #[serde(default)]
    pub feature_richness: f64,
    #[serde(default)]
    pub customization: f64,
    #[serde(default)]
    pub support_quality: f64,
    #[serde(default)]
    pub service_integration: f64,
}

impl PreferenceWeights {
    /// Same weight for every feature.
    pub fn uniform(weight: f64) -> Self {
        Self {
            price: weight,
            privacy: weight,
            performance: weight,
            ease_of_use: weight,
            feature_richness: weight,
            customization: weight,
            support_quality: weight,
            service_integration: weight,
        }
    }

    pub fn weight(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Price => self.price,
            FeatureKind::Privacy => self.privacy,
            FeatureKind::Performance => self.performance,
            FeatureKind::EaseOfUse => self.ease_of_use,
            FeatureKind::FeatureRichness => self.feature_richness,
            FeatureKind::Customization => self.customization,
            FeatureKind::SupportQuality => self.support_quality,
            FeatureKind::ServiceIntegration => self.service_integration,
            // Rating rides on the performance weight and has no slot.
            FeatureKind::Rating => 0.0,
        }
    }

    pub fn set_weight(&mut self, kind: FeatureKind, weight: f64) {
        match kind {
            FeatureKind::Price => self.price = weight,
            FeatureKind::Privacy => self.privacy = weight,
            FeatureKind::Performance => self.performance = weight,
            FeatureKind::EaseOfUse => self.ease_of_use = weight,
            FeatureKind::FeatureRichness => self.feature_richness = weight,
            FeatureKind::Customization => self.customization = weight,
            FeatureKind::SupportQuality => self.support_quality = weight,
            FeatureKind::ServiceIntegration => self.service_integration = weight,
            FeatureKind::Rating => {}
        }
    }

    pub fn is_all_zero(&self) -> bool {
        FeatureKind::WEIGHTED
            .iter()
            .all(|kind| self.weight(*kind) == 0.0)
    }
}

/// Named alternate weighting used to probe ranking sensitivity. Applying a
/// scenario produces a fresh weight vector; the base vector is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub adjustments: Vec<WeightAdjustment>,
}

/// Scales a single feature weight by `factor`, clamped back into `0..=10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightAdjustment {
    pub feature: FeatureKind,
    pub factor: f64,
}

impl Scenario {
    pub fn weights(&self, base: &PreferenceWeights) -> PreferenceWeights {
        let mut scaled = base.clone();
        for adjustment in &self.adjustments {
            let current = scaled.weight(adjustment.feature);
            scaled.set_weight(
                adjustment.feature,
                (current * adjustment.factor).clamp(0.0, 10.0),
            );
        }
        scaled
    }
}
