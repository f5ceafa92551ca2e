use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCrm, InMemoryLeadStore, TracingAnalyticsSink};
use crate::routes::with_quiz_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use medicare_quiz::config::AppConfig;
use medicare_quiz::error::AppError;
use medicare_quiz::quiz::LeadService;
use medicare_quiz::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lead_service = Arc::new(LeadService::new(
        Arc::new(InMemoryLeadStore::default()),
        Arc::new(InMemoryCrm::default()),
        Arc::new(TracingAnalyticsSink::default()),
        config.quiz.clone(),
    ));

    let app = with_quiz_routes(lead_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        url_slug = %config.quiz.url_slug,
        "medicare quiz service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
