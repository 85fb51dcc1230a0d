use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use appscope::workflows::comparison::{
    AppId, AppProfile, AttributeCatalog, CatalogError, CatalogMetadata, FeatureKind,
    PreferenceWeights,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory catalog backing demos and tests when no CSV path is configured.
pub(crate) struct InMemoryCatalog {
    profiles: BTreeMap<String, AppProfile>,
}

impl InMemoryCatalog {
    pub(crate) fn new(profiles: Vec<AppProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.display_name.trim().to_lowercase(), profile))
            .collect();
        Self { profiles }
    }
}

impl AttributeCatalog for InMemoryCatalog {
    fn resolve(&self, name: &str) -> Result<Option<AppProfile>, CatalogError> {
        Ok(self
            .profiles
            .get(&name.trim().to_lowercase())
            .cloned())
    }

    fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AppProfile>, CatalogError> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<AppProfile> = self
            .profiles
            .values()
            .filter(|profile| {
                needle.is_empty() || profile.display_name.to_lowercase().contains(&needle)
            })
            .filter(|profile| match category {
                Some(wanted) => profile
                    .category
                    .as_deref()
                    .map(|have| have.eq_ignore_ascii_case(wanted))
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.popularity
                .unwrap_or(0.0)
                .total_cmp(&a.popularity.unwrap_or(0.0))
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    fn metadata(&self) -> Result<CatalogMetadata, CatalogError> {
        let mut categories: Vec<String> = self
            .profiles
            .values()
            .filter_map(|profile| profile.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        let mut regions: Vec<String> = self
            .profiles
            .values()
            .filter_map(|profile| profile.region.clone())
            .collect();
        regions.sort();
        regions.dedup();
        Ok(CatalogMetadata {
            categories,
            regions,
        })
    }
}

/// Balanced starting point for CLI runs; individual weights are overridden
/// with repeated `--weight` flags.
pub(crate) fn default_preference_weights() -> PreferenceWeights {
    PreferenceWeights::uniform(5.0)
}

pub(crate) fn demo_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        demo_profile(
            "ChatterBox",
            "Communication",
            Some("Global"),
            0.0,
            4.5,
            5_000_000.0,
            4,
            [8.0, 8.5, 9.0, 8.0, 6.5, 7.0],
        ),
        demo_profile(
            "NoteNest",
            "Productivity",
            Some("EU"),
            4.5,
            4.2,
            1_200_000.0,
            2,
            [7.0, 7.5, 8.0, 9.0, 8.5, 6.0],
        ),
        demo_profile(
            "PixelPad",
            "Productivity",
            Some("EU"),
            2.0,
            3.9,
            800_000.0,
            1,
            [6.0, 7.0, 7.5, 6.5, 7.0, 5.5],
        ),
        demo_profile(
            "GhostWire",
            "Communication",
            Some("US"),
            0.0,
            4.8,
            300_000.0,
            3,
            [9.5, 8.0, 6.5, 5.5, 4.0, 6.0],
        ),
    ])
}

fn demo_profile(
    name: &str,
    category: &str,
    region: Option<&str>,
    price: f64,
    rating: f64,
    popularity: f64,
    services_count: u8,
    scores: [f64; 6],
) -> AppProfile {
    let [privacy, performance, ease_of_use, feature_richness, customization, support_quality] =
        scores;
    let feature_scores: BTreeMap<FeatureKind, Option<f64>> = [
        (FeatureKind::Privacy, privacy),
        (FeatureKind::Performance, performance),
        (FeatureKind::EaseOfUse, ease_of_use),
        (FeatureKind::FeatureRichness, feature_richness),
        (FeatureKind::Customization, customization),
        (FeatureKind::SupportQuality, support_quality),
    ]
    .into_iter()
    .map(|(kind, value)| (kind, Some(value)))
    .collect();

    AppProfile {
        app_id: AppId(name.to_lowercase()),
        display_name: name.to_string(),
        category: Some(category.to_string()),
        price,
        rating,
        services_count,
        popularity: Some(popularity),
        region: region.map(str::to_string),
        feature_scores,
    }
}

/// Parse a `feature=weight` pair from the command line.
pub(crate) fn parse_weight(raw: &str) -> Result<(FeatureKind, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected feature=weight, got '{raw}'"))?;

    let feature = match name.trim() {
        "price" => FeatureKind::Price,
        "privacy" => FeatureKind::Privacy,
        "performance" => FeatureKind::Performance,
        "easeOfUse" | "ease-of-use" => FeatureKind::EaseOfUse,
        "featureRichness" | "feature-richness" => FeatureKind::FeatureRichness,
        "customization" => FeatureKind::Customization,
        "supportQuality" | "support-quality" => FeatureKind::SupportQuality,
        "serviceIntegration" | "service-integration" => FeatureKind::ServiceIntegration,
        other => return Err(format!("unknown feature '{other}'")),
    };

    let weight = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{value}' as a weight ({err})"))?;
    if !(0.0..=10.0).contains(&weight) {
        return Err(format!("weight for {feature} must lie in 0..=10"));
    }

    Ok((feature, weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_weight_accepts_kebab_and_camel_names() {
        assert_eq!(
            parse_weight("service-integration=10"),
            Ok((FeatureKind::ServiceIntegration, 10.0))
        );
        assert_eq!(
            parse_weight("easeOfUse=3.5"),
            Ok((FeatureKind::EaseOfUse, 3.5))
        );
    }

    #[test]
    fn parse_weight_rejects_unknown_features_and_bad_ranges() {
        assert!(parse_weight("sparkle=5").is_err());
        assert!(parse_weight("price=11").is_err());
        assert!(parse_weight("price").is_err());
    }

    #[test]
    fn demo_catalog_resolves_complete_records() {
        let catalog = demo_catalog();
        let profile = catalog
            .resolve("chatterbox")
            .expect("catalog healthy")
            .expect("app present");
        assert!(profile.has_complete_record());
    }
}
