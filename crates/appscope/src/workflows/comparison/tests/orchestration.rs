use super::common::{full_candidate, full_profile, orchestrator, price_only_weights};
use crate::workflows::comparison::domain::{
    AppId, CompletenessMode, FeatureKind, PreferenceWeights,
};
use crate::workflows::comparison::explain::explain;
use crate::workflows::comparison::orchestrator::{
    rank_apps, ComparisonError, RankedApp,
};
use crate::workflows::comparison::scoring::ScoreResult;

fn ranked_app(name: &str, score: f64, popularity: Option<f64>) -> RankedApp {
    RankedApp {
        display_name: name.to_string(),
        popularity,
        result: ScoreResult {
            app_id: AppId(name.to_lowercase()),
            mode: CompletenessMode::Full,
            score,
            components: Vec::new(),
            attributes_used: Vec::new(),
            attributes_excluded: Vec::new(),
        },
    }
}

#[test]
fn batches_outside_two_to_five_are_rejected() {
    let orchestrator = orchestrator();
    let weights = PreferenceWeights::uniform(5.0);

    let one = vec![full_candidate(full_profile("Solo", 1.0, 1, 5.0))];
    match orchestrator.compare(&one, &weights) {
        Err(ComparisonError::InsufficientEntities(1)) => {}
        other => panic!("expected insufficient entities, got {other:?}"),
    }

    let six: Vec<_> = (0..6)
        .map(|index| full_candidate(full_profile(&format!("App{index}"), 1.0, 1, 5.0)))
        .collect();
    match orchestrator.compare(&six, &weights) {
        Err(ComparisonError::TooManyEntities(6)) => {}
        other => panic!("expected too many entities, got {other:?}"),
    }
}

#[test]
fn near_ties_fall_back_to_popularity() {
    // 7.25 and 7.2 sit inside the near-tie window, so the raw score order
    // must not decide.
    let mut apps = vec![
        ranked_app("ScoresHigher", 7.25, Some(100.0)),
        ranked_app("MorePopular", 7.2, Some(900.0)),
    ];
    rank_apps(&mut apps);
    assert_eq!(apps[0].display_name, "MorePopular");
    assert_eq!(apps[1].display_name, "ScoresHigher");
}

#[test]
fn clear_gaps_are_decided_by_score_alone() {
    let mut apps = vec![
        ranked_app("Niche", 9.0, Some(10.0)),
        ranked_app("Household", 6.0, Some(9_000_000.0)),
    ];
    rank_apps(&mut apps);
    assert_eq!(apps[0].display_name, "Niche");
}

#[test]
fn equal_scores_from_the_engine_use_popularity() {
    let orchestrator = orchestrator();
    let mut underdog = full_profile("Underdog", 2.8, 1, 5.0);
    underdog.popularity = Some(1_000.0);
    let mut favorite = full_profile("Favorite", 2.8, 1, 5.0);
    favorite.popularity = Some(50_000.0);

    let outcome = orchestrator
        .compare(
            &[full_candidate(underdog), full_candidate(favorite)],
            &price_only_weights(10.0),
        )
        .expect("comparison runs");

    assert_eq!(outcome.winner, AppId("favorite".to_string()));
}

#[test]
fn comparison_is_deterministic() {
    let orchestrator = orchestrator();
    let candidates = vec![
        full_candidate(full_profile("Alpha", 1.0, 2, 7.0)),
        full_candidate(full_profile("Beta", 3.0, 4, 6.0)),
        full_candidate(full_profile("Gamma", 0.0, 1, 8.0)),
    ];
    let weights = PreferenceWeights::uniform(5.0);

    let first = orchestrator
        .compare(&candidates, &weights)
        .expect("comparison runs");
    let second = orchestrator
        .compare(&candidates, &weights)
        .expect("comparison runs");
    assert_eq!(first, second);
}

#[test]
fn candidate_order_does_not_change_the_ranking() {
    let orchestrator = orchestrator();
    let forward = vec![
        full_candidate(full_profile("Alpha", 1.0, 2, 7.0)),
        full_candidate(full_profile("Beta", 6.0, 1, 4.0)),
        full_candidate(full_profile("Gamma", 0.0, 4, 8.0)),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();
    let weights = PreferenceWeights::uniform(5.0);

    let forward_ids: Vec<AppId> = orchestrator
        .compare(&forward, &weights)
        .expect("comparison runs")
        .ranked
        .iter()
        .map(|app| app.result.app_id.clone())
        .collect();
    let reversed_ids: Vec<AppId> = orchestrator
        .compare(&reversed, &weights)
        .expect("comparison runs")
        .ranked
        .iter()
        .map(|app| app.result.app_id.clone())
        .collect();

    assert_eq!(forward_ids, reversed_ids);
}

#[test]
fn winner_points_at_the_first_ranked_entry() {
    let orchestrator = orchestrator();
    let outcome = orchestrator
        .compare(
            &[
                full_candidate(full_profile("Cheap", 0.0, 1, 5.0)),
                full_candidate(full_profile("Costly", 8.0, 1, 5.0)),
            ],
            &price_only_weights(10.0),
        )
        .expect("comparison runs");
    assert_eq!(&outcome.winner, outcome.ranked[0].app_id());
}

#[test]
fn bundled_services_dominate_when_integration_matters_most() {
    let orchestrator = orchestrator();
    let a = full_profile("BundleKing", 0.0, 4, 7.0);
    let b = full_profile("LoneTool", 5.0, 1, 7.0);
    let weights = PreferenceWeights {
        service_integration: 10.0,
        ..PreferenceWeights::uniform(5.0)
    };

    let outcome = orchestrator
        .compare(&[full_candidate(a), full_candidate(b)], &weights)
        .expect("comparison runs");

    assert_eq!(outcome.winner, AppId("bundleking".to_string()));

    let contribution_for = |name: &str| -> f64 {
        let app = outcome
            .ranked
            .iter()
            .find(|app| app.result.app_id.0 == name)
            .expect("app ranked");
        explain(&app.result)
            .into_iter()
            .find(|row| row.feature == FeatureKind::ServiceIntegration)
            .expect("integration row present")
            .contribution
    };

    assert_eq!(contribution_for("bundleking"), 100.0);
    assert_eq!(contribution_for("lonetool"), 50.0);
}
