use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryClaimNotifier, InMemoryClaimRepository};
use crate::routes::with_claim_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_claims::config::AppConfig;
use fleet_claims::error::AppError;
use fleet_claims::telemetry;
use fleet_claims::workflows::claims::{ClaimAssessmentService, PricingCatalog};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let pricing = config.pricing.resolve()?;
    let catalog = Arc::new(PricingCatalog::new(pricing)?);
    info!(
        source = %config
            .pricing
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "pricing catalog loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
    };

    let repository = Arc::new(InMemoryClaimRepository::default());
    let notifier = Arc::new(InMemoryClaimNotifier::default());
    let claim_service = Arc::new(ClaimAssessmentService::new(repository, notifier, catalog));

    let app = with_claim_routes(claim_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fleet claims estimator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
