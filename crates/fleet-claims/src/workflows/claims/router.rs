use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ClaimId, ClaimSubmission};
use super::repository::{ClaimNotifier, ClaimRepository, RepositoryError};
use super::service::{ClaimAssessmentService, ClaimServiceError};
use super::views::{EstimateView, HealthView, SettlementView};

/// Router builder exposing HTTP endpoints for claim intake, estimation, and settlement.
pub fn claims_router<R, N>(service: Arc<ClaimAssessmentService<R, N>>) -> Router
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    Router::new()
        .route("/api/v1/claims", post(submit_handler::<R, N>))
        .route("/api/v1/claims/:claim_id", get(status_handler::<R, N>))
        .route(
            "/api/v1/claims/:claim_id/estimate",
            post(estimate_handler::<R, N>),
        )
        .route(
            "/api/v1/claims/:claim_id/settlement",
            post(settlement_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettlementQuery {
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ClaimAssessmentService<R, N>>>,
    axum::Json(submission): axum::Json<ClaimSubmission>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(ClaimServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "claim already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<ClaimAssessmentService<R, N>>>,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    match service.get(&ClaimId(claim_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn estimate_handler<R, N>(
    State(service): State<Arc<ClaimAssessmentService<R, N>>>,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    let id = ClaimId(claim_id);
    let breakdown = match service.estimate(&id) {
        Ok(breakdown) => breakdown,
        Err(other) => return error_response(other),
    };

    match service.get(&id) {
        Ok(record) => {
            let payload = json!({
                "claim": record.status_view(),
                "estimate": EstimateView::from(&breakdown),
                "health": record.health.as_ref().map(HealthView::from),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn settlement_handler<R, N>(
    State(service): State<Arc<ClaimAssessmentService<R, N>>>,
    Path(claim_id): Path<String>,
    Query(query): Query<SettlementQuery>,
) -> Response
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    let id = ClaimId(claim_id);
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    let settlement = match service.settle(&id, as_of) {
        Ok(settlement) => settlement,
        Err(other) => return error_response(other),
    };

    match service.get(&id) {
        Ok(record) => {
            let payload = json!({
                "claim": record.status_view(),
                "settlement": SettlementView::from(&settlement),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

fn error_response(error: ClaimServiceError) -> Response {
    let status = match &error {
        ClaimServiceError::Estimate(_) | ClaimServiceError::Settlement(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClaimServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ClaimServiceError::Repository(RepositoryError::Conflict)
        | ClaimServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ClaimServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
