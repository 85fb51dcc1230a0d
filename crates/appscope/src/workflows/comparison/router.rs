use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::AttributeCatalog;
use super::domain::{AppId, CompletenessMode, FeatureKind};
use super::orchestrator::{ComparisonError, ComparisonOutcome, RankedApp};
use super::scoring::ScoringError;
use super::service::{
    ComparisonService, ComparisonServiceError, ComparisonSubmission, InsightsSubmission,
    DEFAULT_SEARCH_LIMIT,
};

/// Router builder exposing HTTP endpoints for validation, search, and
/// comparison.
pub fn comparison_router<C>(service: Arc<ComparisonService<C>>) -> Router
where
    C: AttributeCatalog + 'static,
{
    Router::new()
        .route("/api/v1/apps/validate", post(validate_handler::<C>))
        .route("/api/v1/apps/search", get(search_handler::<C>))
        .route("/api/v1/catalog/metadata", get(metadata_handler::<C>))
        .route("/api/v1/comparisons", post(compare_handler::<C>))
        .route(
            "/api/v1/comparisons/insights",
            post(insights_handler::<C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateRequest {
    pub(crate) app_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    pub(crate) query: String,
    pub(crate) category: Option<String>,
    pub(crate) limit: Option<usize>,
}

/// Wire view of a ranked entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankedAppView {
    pub(crate) id: AppId,
    pub(crate) name: String,
    pub(crate) mode: CompletenessMode,
    pub(crate) score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) popularity: Option<f64>,
    pub(crate) attributes_used: Vec<FeatureKind>,
    pub(crate) attributes_excluded: Vec<FeatureKind>,
}

impl From<&RankedApp> for RankedAppView {
    fn from(app: &RankedApp) -> Self {
        Self {
            id: app.result.app_id.clone(),
            name: app.display_name.clone(),
            mode: app.result.mode,
            score: app.result.score,
            popularity: app.popularity,
            attributes_used: app.result.attributes_used.clone(),
            attributes_excluded: app.result.attributes_excluded.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompareResponse {
    pub(crate) winner: RankedAppView,
    pub(crate) ranked: Vec<RankedAppView>,
}

impl CompareResponse {
    fn from_outcome(outcome: &ComparisonOutcome) -> Option<Self> {
        let winner = outcome
            .ranked
            .iter()
            .find(|app| app.result.app_id == outcome.winner)
            .map(RankedAppView::from)?;
        Some(Self {
            winner,
            ranked: outcome.ranked.iter().map(RankedAppView::from).collect(),
        })
    }
}

pub(crate) async fn validate_handler<C>(
    State(service): State<Arc<ComparisonService<C>>>,
    axum::Json(request): axum::Json<ValidateRequest>,
) -> Response
where
    C: AttributeCatalog + 'static,
{
    match service.validate(&request.app_name) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_handler<C>(
    State(service): State<Arc<ComparisonService<C>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    C: AttributeCatalog + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    match service.search(&params.query, params.category.as_deref(), limit) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn metadata_handler<C>(
    State(service): State<Arc<ComparisonService<C>>>,
) -> Response
where
    C: AttributeCatalog + 'static,
{
    match service.metadata() {
        Ok(metadata) => (StatusCode::OK, axum::Json(metadata)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compare_handler<C>(
    State(service): State<Arc<ComparisonService<C>>>,
    axum::Json(submission): axum::Json<ComparisonSubmission>,
) -> Response
where
    C: AttributeCatalog + 'static,
{
    match service.compare(&submission) {
        Ok(outcome) => match CompareResponse::from_outcome(&outcome) {
            Some(response) => (StatusCode::OK, axum::Json(response)).into_response(),
            None => error_response(ComparisonServiceError::Comparison(
                ComparisonError::InsufficientEntities(0),
            )),
        },
        Err(error) => error_response(error),
    }
}

pub(crate) async fn insights_handler<C>(
    State(service): State<Arc<ComparisonService<C>>>,
    axum::Json(submission): axum::Json<InsightsSubmission>,
) -> Response
where
    C: AttributeCatalog + 'static,
{
    match service.insights(&submission) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ComparisonServiceError) -> Response {
    let status = match &error {
        ComparisonServiceError::UnknownFullApp(_) => StatusCode::BAD_REQUEST,
        ComparisonServiceError::Comparison(comparison) => match comparison {
            ComparisonError::InsufficientEntities(_) | ComparisonError::TooManyEntities(_) => {
                StatusCode::BAD_REQUEST
            }
            ComparisonError::Scoring(scoring) => match scoring {
                ScoringError::IncompleteRecord { .. }
                | ScoringError::InvalidWeight { .. }
                | ScoringError::DegenerateAggregation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
        },
        ComparisonServiceError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
