use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use fleet_claims::error::AppError;
use fleet_claims::workflows::claims::{
    claims_router, ClaimAssessmentService, ClaimNotifier, ClaimRepository, DamageAssessment,
    EstimateView, HealthView, PricingConfig, SettlementView, VehicleValuation,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct EstimateRequest {
    pub(crate) assessment: DamageAssessment,
    #[serde(default)]
    pub(crate) valuation: Option<VehicleValuation>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EstimateResponse {
    pub(crate) estimate: EstimateView,
    pub(crate) health: HealthView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) settlement: Option<SettlementView>,
}

pub(crate) fn with_claim_routes<R, N>(service: Arc<ClaimAssessmentService<R, N>>) -> axum::Router
where
    R: ClaimRepository + 'static,
    N: ClaimNotifier + 'static,
{
    claims_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/estimates", post(estimate_endpoint))
        .route(
            "/api/v1/pricing",
            get(pricing_snapshot_endpoint).put(pricing_replace_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless estimate: prices an assessment and, when a valuation is supplied, settles it.
pub(crate) async fn estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let EstimateRequest {
        assessment,
        valuation,
        as_of,
    } = payload;

    let engine = state.catalog.engine();
    let breakdown = engine.breakdown(&assessment)?;
    let health = engine.health(&assessment)?;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let settlement = valuation
        .map(|valuation| engine.settle(&breakdown, &valuation, as_of))
        .transpose()?;

    Ok(Json(EstimateResponse {
        estimate: EstimateView::from(&breakdown),
        health: HealthView::from(&health),
        settlement: settlement.as_ref().map(SettlementView::from),
    }))
}

pub(crate) async fn pricing_snapshot_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<PricingConfig> {
    Json(state.catalog.snapshot().as_ref().clone())
}

pub(crate) async fn pricing_replace_endpoint(
    Extension(state): Extension<AppState>,
    Json(config): Json<PricingConfig>,
) -> Result<StatusCode, AppError> {
    state.catalog.replace(config)?;
    info!("pricing tables replaced over http");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryClaimNotifier, InMemoryClaimRepository};
    use axum::body::Body;
    use axum::http::Request;
    use fleet_claims::workflows::claims::{
        ComponentAssessment, DamageSection, EstimateError, PricingCatalog, SettlementError,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            catalog: Arc::new(PricingCatalog::standard()),
        }
    }

    fn exterior_damage() -> DamageAssessment {
        DamageAssessment::new().with_section(
            DamageSection::Exterior,
            ComponentAssessment::new()
                .with("hood", "light")
                .with("front_bumper", "light"),
        )
    }

    #[tokio::test]
    async fn estimate_endpoint_prices_without_valuation() {
        let request = EstimateRequest {
            assessment: exterior_damage(),
            valuation: None,
            as_of: None,
        };

        let Json(body) = estimate_endpoint(Extension(app_state(true)), Json(request))
            .await
            .expect("estimate builds");

        assert_eq!(body.estimate.grand_total, dec!(1693.71));
        assert_eq!(body.estimate.sections.len(), 8);
        assert_eq!(body.health.index, dec!(97.5));
        assert!(body.settlement.is_none());
    }

    #[tokio::test]
    async fn estimate_endpoint_settles_valued_vehicle() {
        let request = EstimateRequest {
            assessment: exterior_damage(),
            valuation: Some(VehicleValuation {
                market_value: Some(dec!(2000)),
                manufacture_year: 2015,
                salvage_value: Some(dec!(300)),
                deductible: Some(dec!(100)),
            }),
            as_of: NaiveDate::from_ymd_opt(2025, 1, 10),
        };

        let Json(body) = estimate_endpoint(Extension(app_state(true)), Json(request))
            .await
            .expect("estimate builds");

        let settlement = body.settlement.expect("settlement returned");
        assert!(settlement.is_total_loss);
        assert_eq!(settlement.vehicle_age, 10);
        // 15% age cap plus 2% cosmetic damage on a 2000 vehicle
        assert_eq!(settlement.depreciation_amount, dec!(340.00));
        assert_eq!(settlement.settlement_amount, dec!(1860.00));
    }

    #[tokio::test]
    async fn estimate_endpoint_rejects_unknown_severity() {
        let request = EstimateRequest {
            assessment: DamageAssessment::new().with_section(
                DamageSection::Safety,
                ComponentAssessment::new().with("airbags", "deployed"),
            ),
            valuation: None,
            as_of: None,
        };

        match estimate_endpoint(Extension(app_state(true)), Json(request)).await {
            Err(AppError::Estimate(EstimateError::InvalidSeverity { value, .. })) => {
                assert_eq!(value, "deployed")
            }
            other => panic!("expected invalid severity, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn estimate_endpoint_rejects_unrepresentable_valuation() {
        let request = EstimateRequest {
            assessment: exterior_damage(),
            valuation: Some(VehicleValuation {
                market_value: Some(dec!(2000)),
                manufacture_year: i32::MIN,
                salvage_value: None,
                deductible: None,
            }),
            as_of: NaiveDate::from_ymd_opt(2025, 1, 10),
        };

        let error = estimate_endpoint(Extension(app_state(true)), Json(request))
            .await
            .err()
            .expect("valuation rejected");
        assert!(matches!(
            error,
            AppError::Settlement(SettlementError::Overflow { .. })
        ));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn pricing_replace_validates_before_swapping() {
        let state = app_state(true);
        let mut broken = PricingConfig::standard();
        broken.rates.tax_rate = dec!(-0.2);

        let result = pricing_replace_endpoint(Extension(state.clone()), Json(broken)).await;
        assert!(matches!(result, Err(AppError::Pricing(_))));
        assert_eq!(state.catalog.snapshot().rates.tax_rate, dec!(0.20));

        let mut revised = PricingConfig::standard();
        revised.rates.tax_rate = dec!(0.175);
        let status = pricing_replace_endpoint(Extension(state.clone()), Json(revised))
            .await
            .expect("valid tables swap");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(snapshot) = pricing_snapshot_endpoint(Extension(state)).await;
        assert_eq!(snapshot.rates.tax_rate, dec!(0.175));
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn estimate_route_is_mounted_alongside_claim_routes() {
        let state = app_state(true);
        let service = Arc::new(ClaimAssessmentService::new(
            Arc::new(InMemoryClaimRepository::default()),
            Arc::new(InMemoryClaimNotifier::default()),
            state.catalog.clone(),
        ));
        let app = with_claim_routes(service).layer(Extension(state));

        let body = json!({
            "assessment": { "mechanical": { "engine_block": "failed" } },
            "valuation": { "market_value": "15000", "manufacture_year": 2022 },
            "as_of": "2025-10-01"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/estimates")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json payload");
        assert_eq!(payload["estimate"]["grand_total"], "16560.72");
        assert_eq!(payload["settlement"]["recommendation"], "total_loss");
    }
}
