use std::path::PathBuf;
use std::sync::Arc;

use appscope::error::AppError;
use appscope::workflows::comparison::{
    explain, AppExplanation, AppSelection, AttributeCatalog, CompletenessMode, ComparisonOutcome,
    ComparisonService, ComparisonSubmission, CsvCatalog, FeatureKind, InsightsReport,
    InsightsSubmission, PreferenceWeights, Scenario, ScoringConfig, WeightAdjustment,
};
use clap::Args;

use crate::infra::{default_preference_weights, demo_catalog, parse_weight};

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// App to include in the comparison (repeat for each app, 2-5 total)
    #[arg(long = "app", required = true)]
    pub(crate) apps: Vec<String>,
    /// Weight override as feature=weight, e.g. price=8 (repeatable)
    #[arg(long = "weight", value_parser = parse_weight)]
    pub(crate) weights: Vec<(FeatureKind, f64)>,
    /// CSV catalog to compare against (defaults to the bundled demo catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// CSV catalog to demo against (defaults to the bundled demo catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Skip the market insight portion of the demo
    #[arg(long)]
    pub(crate) skip_insights: bool,
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let CompareArgs {
        apps,
        weights,
        catalog,
    } = args;

    let mut preferences = default_preference_weights();
    for (feature, weight) in weights {
        preferences.set_weight(feature, weight);
    }

    match catalog {
        Some(path) => {
            let catalog = Arc::new(CsvCatalog::from_path(path)?);
            compare_and_render(catalog, apps, preferences)
        }
        None => compare_and_render(Arc::new(demo_catalog()), apps, preferences),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        catalog,
        skip_insights,
    } = args;

    match catalog {
        Some(path) => {
            let catalog = Arc::new(CsvCatalog::from_path(path)?);
            demo_with(catalog, skip_insights)
        }
        None => demo_with(Arc::new(demo_catalog()), skip_insights),
    }
}

fn compare_and_render<C>(
    catalog: Arc<C>,
    apps: Vec<String>,
    preferences: PreferenceWeights,
) -> Result<(), AppError>
where
    C: AttributeCatalog + 'static,
{
    let service = ComparisonService::new(catalog, ScoringConfig::default());

    let mut selections = Vec::with_capacity(apps.len());
    for name in &apps {
        let validation = service.validate(name)?;
        selections.push(AppSelection {
            name: name.clone(),
            mode: validation.comparison_mode,
        });
    }

    let submission = ComparisonSubmission {
        apps: selections,
        preferences,
    };
    let outcome = service.compare(&submission)?;
    render_outcome(&outcome);

    println!("\nContribution breakdown per app");
    for app in &outcome.ranked {
        println!("- {} ({})", app.display_name, app.result.mode.label());
        for row in explain(&app.result) {
            println!(
                "    {} = {:.1} x {:.1} -> {:.1} ({:.1}% of score)",
                row.feature,
                row.value,
                row.weight,
                row.contribution,
                row.normalized_share * 100.0
            );
        }
        if !app.result.attributes_excluded.is_empty() {
            let excluded: Vec<&str> = app
                .result
                .attributes_excluded
                .iter()
                .map(|kind| kind.label())
                .collect();
            println!("    excluded: {}", excluded.join(", "));
        }
    }

    Ok(())
}

fn demo_with<C>(catalog: Arc<C>, skip_insights: bool) -> Result<(), AppError>
where
    C: AttributeCatalog + 'static,
{
    let service = ComparisonService::new(catalog, ScoringConfig::default());
    let preferences = default_preference_weights();

    println!("App comparison demo");

    let candidates = service.search("", None, 4)?;
    let selections: Vec<AppSelection> = candidates
        .iter()
        .map(|profile| {
            let mode = if profile.has_complete_record() {
                CompletenessMode::Full
            } else {
                CompletenessMode::Partial
            };
            AppSelection {
                name: profile.display_name.clone(),
                mode,
            }
        })
        .collect();
    let names: Vec<&str> = selections
        .iter()
        .map(|selection| selection.name.as_str())
        .collect();
    println!("Comparing: {}", names.join(", "));

    let submission = ComparisonSubmission {
        apps: selections.clone(),
        preferences: preferences.clone(),
    };
    let outcome = service.compare(&submission)?;
    render_outcome(&outcome);

    if skip_insights {
        return Ok(());
    }

    let insights = service.insights(&InsightsSubmission {
        apps: selections,
        preferences,
        scenarios: vec![
            Scenario {
                name: "PriceCrunch".to_string(),
                adjustments: vec![WeightAdjustment {
                    feature: FeatureKind::Price,
                    factor: 1.5,
                }],
            },
            Scenario {
                name: "PrivacyFirst".to_string(),
                adjustments: vec![WeightAdjustment {
                    feature: FeatureKind::Privacy,
                    factor: 2.0,
                }],
            },
        ],
    })?;
    render_insights(&insights);

    Ok(())
}

fn render_outcome(outcome: &ComparisonOutcome) {
    println!("\nRanked comparison");
    for (position, app) in outcome.ranked.iter().enumerate() {
        let popularity_note = match app.popularity {
            Some(popularity) => format!(" | popularity {popularity:.0}"),
            None => String::new(),
        };
        println!(
            "{}. {} | score {:.1} | {}{}",
            position + 1,
            app.display_name,
            app.result.score,
            app.result.mode.label(),
            popularity_note
        );
    }
    println!("Winner: {}", outcome.winner);
}

fn render_insights(insights: &InsightsReport) {
    println!("\nFeature dominance (within this cohort)");
    for entry in &insights.fdi {
        println!("- {}: {:.4}", entry.display_name, entry.dominance_index);
    }

    println!(
        "\nConsumer confusion: {:.4} ({})",
        insights.consumer_confusion,
        insights.confusion_band.label()
    );

    println!("\nScenario rankings");
    for scenario in &insights.scenarios {
        let order: Vec<String> = scenario
            .ranked
            .iter()
            .map(|app| format!("{} ({:.1})", app.display_name, app.result.score))
            .collect();
        println!("- {}: {}", scenario.name, order.join(" > "));
    }

    println!("\nTop contribution per app");
    for explanation in &insights.explainability {
        render_top_contribution(explanation);
    }

    if insights.regional.is_empty() {
        println!("\nRegional breakdown: no tagged apps");
    } else {
        println!("\nRegional breakdown");
        for region in &insights.regional {
            println!("- {} ({} apps)", region.region, region.count);
            for entry in &region.dominance {
                println!("    {}: {:.4}", entry.display_name, entry.dominance_index);
            }
        }
    }
}

fn render_top_contribution(explanation: &AppExplanation) {
    match explanation.breakdown.first() {
        Some(top) => println!(
            "- {} (score {:.1}): {} contributes {:.1}%",
            explanation.display_name,
            explanation.score,
            top.feature,
            top.normalized_share * 100.0
        ),
        None => println!(
            "- {} (score {:.1}): no weighted features",
            explanation.display_name, explanation.score
        ),
    }
}
