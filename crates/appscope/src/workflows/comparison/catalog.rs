use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{AppId, AppProfile, FeatureKind};

/// Fallback when a row carries no service count. A published app
/// participates in at least its own service.
const DEFAULT_SERVICES_COUNT: u8 = 1;

/// Read-only attribute store keyed by normalized app name. Resolution is an
/// upstream step: the scoring engine only ever sees records a catalog has
/// already materialized.
pub trait AttributeCatalog: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<AppProfile>, CatalogError>;
    fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AppProfile>, CatalogError>;
    fn metadata(&self) -> Result<CatalogMetadata, CatalogError>;
}

/// Distinct categories and region tags present in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogMetadata {
    pub categories: Vec<String>,
    pub regions: Vec<String>,
}

/// Error enumeration for catalog failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// CSV-backed catalog loaded once at startup and shared read-only.
pub struct CsvCatalog {
    profiles: BTreeMap<String, AppProfile>,
}

impl CsvCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut profiles = BTreeMap::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            let profile = row?.into_profile();
            profiles.insert(normalize_name(&profile.display_name), profile);
        }

        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl AttributeCatalog for CsvCatalog {
    fn resolve(&self, name: &str) -> Result<Option<AppProfile>, CatalogError> {
        Ok(self.profiles.get(&normalize_name(name)).cloned())
    }

    fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AppProfile>, CatalogError> {
        let needle = normalize_name(query);
        let mut matches: Vec<AppProfile> = self
            .profiles
            .values()
            .filter(|profile| {
                needle.is_empty() || normalize_name(&profile.display_name).contains(&needle)
            })
            .filter(|profile| match category {
                Some(wanted) => profile
                    .category
                    .as_deref()
                    .map(|have| {
                        have.eq_ignore_ascii_case(wanted)
                            || normalize_name(have).contains(&normalize_name(wanted))
                    })
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();

        matches.sort_by(search_ordering);
        matches.truncate(limit);
        Ok(matches)
    }

    fn metadata(&self) -> Result<CatalogMetadata, CatalogError> {
        let mut categories = BTreeSet::new();
        let mut regions = BTreeSet::new();
        for profile in self.profiles.values() {
            if let Some(category) = &profile.category {
                if !category.trim().is_empty() {
                    categories.insert(category.trim().to_string());
                }
            }
            if let Some(region) = &profile.region {
                if !region.trim().is_empty() {
                    regions.insert(region.trim().to_string());
                }
            }
        }
        Ok(CatalogMetadata {
            categories: categories.into_iter().collect(),
            regions: regions.into_iter().collect(),
        })
    }
}

/// Popular apps first, then rating, then name, so search results mirror what
/// users expect to see at the top of a store listing.
fn search_ordering(a: &AppProfile, b: &AppProfile) -> Ordering {
    popularity_descending(a, b)
        .then_with(|| b.rating.total_cmp(&a.rating))
        .then_with(|| a.display_name.cmp(&b.display_name))
}

fn popularity_descending(a: &AppProfile, b: &AppProfile) -> Ordering {
    match (a.popularity, b.popularity) {
        (Some(pa), Some(pb)) => pb.total_cmp(&pa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    app_name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    downloads: Option<f64>,
    #[serde(default)]
    services_count: Option<u8>,
    #[serde(default)]
    privacy_score: Option<f64>,
    #[serde(default)]
    performance_score: Option<f64>,
    #[serde(default)]
    ease_of_use_score: Option<f64>,
    #[serde(default)]
    feature_richness_score: Option<f64>,
    #[serde(default)]
    customization_score: Option<f64>,
    #[serde(default)]
    support_quality_score: Option<f64>,
}

impl CatalogRow {
    fn into_profile(self) -> AppProfile {
        let mut feature_scores = BTreeMap::new();
        let stored = [
            (FeatureKind::Privacy, self.privacy_score),
            (FeatureKind::Performance, self.performance_score),
            (FeatureKind::EaseOfUse, self.ease_of_use_score),
            (FeatureKind::FeatureRichness, self.feature_richness_score),
            (FeatureKind::Customization, self.customization_score),
            (FeatureKind::SupportQuality, self.support_quality_score),
        ];
        for (kind, value) in stored {
            if let Some(value) = value {
                feature_scores.insert(kind, Some(value));
            }
        }

        AppProfile {
            app_id: AppId(normalize_name(&self.app_name)),
            display_name: self.app_name.trim().to_string(),
            category: self.category.filter(|value| !value.trim().is_empty()),
            price: self.price.unwrap_or(0.0),
            rating: self.rating.unwrap_or(0.0),
            services_count: self.services_count.unwrap_or(DEFAULT_SERVICES_COUNT),
            popularity: self.downloads,
            region: self.region.filter(|value| !value.trim().is_empty()),
            feature_scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_FIXTURE: &str = "\
app_name,category,region,price,rating,downloads,services_count,privacy_score,performance_score,ease_of_use_score,feature_richness_score,customization_score,support_quality_score
ChatterBox,Communication,Global,0,4.5,5000000,4,8.0,8.5,9.0,8.0,6.5,7.0
NoteNest,Productivity,EU,4.5,4.2,1200000,2,7.0,7.5,8.0,9.0,8.5,6.0
PixelPad,Productivity,EU,2.0,3.9,800000,1,6.0,7.0,7.5,6.5,7.0,5.5
GhostWire,Communication,,0,4.8,,3,9.5,8.0,6.5,5.5,4.0,
";

    fn catalog() -> CsvCatalog {
        CsvCatalog::from_reader(CSV_FIXTURE.as_bytes()).expect("fixture parses")
    }

    #[test]
    fn resolve_is_case_and_whitespace_insensitive() {
        let catalog = catalog();
        let profile = catalog
            .resolve("  chatterbox ")
            .expect("catalog healthy")
            .expect("app present");
        assert_eq!(profile.display_name, "ChatterBox");
        assert_eq!(profile.services_count, 4);
        assert!(profile.has_complete_record());
    }

    #[test]
    fn empty_cells_become_absent_attributes() {
        let catalog = catalog();
        let profile = catalog
            .resolve("GhostWire")
            .expect("catalog healthy")
            .expect("app present");
        assert!(profile.region.is_none());
        assert!(profile.popularity.is_none());
        assert!(!profile
            .feature_scores
            .contains_key(&FeatureKind::SupportQuality));
        assert!(!profile.has_complete_record());
    }

    #[test]
    fn search_orders_by_popularity_then_rating() {
        let catalog = catalog();
        let results = catalog.search("", None, 10).expect("search runs");
        let names: Vec<&str> = results
            .iter()
            .map(|profile| profile.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["ChatterBox", "NoteNest", "PixelPad", "GhostWire"]);
    }

    #[test]
    fn search_filters_by_category_and_respects_limit() {
        let catalog = catalog();
        let results = catalog
            .search("", Some("productivity"), 1)
            .expect("search runs");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "NoteNest");
    }

    #[test]
    fn metadata_lists_distinct_categories_and_regions() {
        let catalog = catalog();
        let metadata = catalog.metadata().expect("metadata builds");
        assert_eq!(metadata.categories, vec!["Communication", "Productivity"]);
        assert_eq!(metadata.regions, vec!["EU", "Global"]);
    }
}
