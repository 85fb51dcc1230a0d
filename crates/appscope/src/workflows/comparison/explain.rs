use serde::{Deserialize, Serialize};

use super::domain::FeatureKind;
use super::scoring::ScoreResult;

/// One row of the per-feature contribution table backing a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureContribution {
    pub feature: FeatureKind,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    pub normalized_share: f64,
}

/// Decompose a score into contribution shares over the features actually
/// used. Shares sum to 1.0; when every contribution is zero each share is
/// 0.0 rather than NaN. Rows come back ordered by contribution descending,
/// ties broken by feature label so the output is stable for display.
pub fn explain(result: &ScoreResult) -> Vec<FeatureContribution> {
    let mut rows: Vec<FeatureContribution> = result
        .components
        .iter()
        .map(|component| FeatureContribution {
            feature: component.feature,
            value: component.value,
            weight: component.weight,
            contribution: component.value * component.weight,
            normalized_share: 0.0,
        })
        .collect();

    let total: f64 = rows.iter().map(|row| row.contribution).sum();
    if total > 0.0 {
        for row in &mut rows {
            row.normalized_share = row.contribution / total;
        }
    }

    rows.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.feature.label().cmp(b.feature.label()))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::super::domain::{AppId, CompletenessMode, FeatureKind};
    use super::super::scoring::{ScoreComponent, ScoreResult};
    use super::*;

    fn result_with(components: Vec<ScoreComponent>) -> ScoreResult {
        let used = components.iter().map(|c| c.feature).collect();
        ScoreResult {
            app_id: AppId("demo".to_string()),
            mode: CompletenessMode::Full,
            score: 5.0,
            components,
            attributes_used: used,
            attributes_excluded: Vec::new(),
        }
    }

    #[test]
    fn shares_sum_to_one() {
        let result = result_with(vec![
            ScoreComponent {
                feature: FeatureKind::Price,
                value: 10.0,
                weight: 5.0,
            },
            ScoreComponent {
                feature: FeatureKind::Privacy,
                value: 7.0,
                weight: 3.0,
            },
            ScoreComponent {
                feature: FeatureKind::ServiceIntegration,
                value: 8.5,
                weight: 10.0,
            },
        ]);

        let rows = explain(&result);
        let share_total: f64 = rows.iter().map(|row| row.normalized_share).sum();
        assert!((share_total - 1.0).abs() <= 1e-6);
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let result = result_with(vec![
            ScoreComponent {
                feature: FeatureKind::Price,
                value: 0.0,
                weight: 5.0,
            },
            ScoreComponent {
                feature: FeatureKind::Privacy,
                value: 0.0,
                weight: 5.0,
            },
        ]);

        let rows = explain(&result);
        assert!(rows.iter().all(|row| row.normalized_share == 0.0));
        assert!(rows.iter().all(|row| row.normalized_share.is_finite()));
    }

    #[test]
    fn rows_ordered_by_contribution_then_label() {
        let result = result_with(vec![
            ScoreComponent {
                feature: FeatureKind::Performance,
                value: 4.0,
                weight: 5.0,
            },
            ScoreComponent {
                feature: FeatureKind::EaseOfUse,
                value: 5.0,
                weight: 4.0,
            },
            ScoreComponent {
                feature: FeatureKind::Price,
                value: 10.0,
                weight: 5.0,
            },
        ]);

        let rows = explain(&result);
        let order: Vec<FeatureKind> = rows.iter().map(|row| row.feature).collect();
        // Equal contributions (20.0) fall back to label order.
        assert_eq!(
            order,
            vec![
                FeatureKind::Price,
                FeatureKind::EaseOfUse,
                FeatureKind::Performance,
            ]
        );
    }
}
