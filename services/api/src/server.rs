use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReviewRepository, InMemoryReviewerDirectory};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use review_consensus::config::AppConfig;
use review_consensus::error::AppError;
use review_consensus::telemetry;
use review_consensus::workflows::review::ReviewService;
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

    let repository = Arc::new(InMemoryReviewRepository::default());
    let directory = Arc::new(InMemoryReviewerDirectory::default());
    let review_service = Arc::new(ReviewService::with_thresholds(
        repository,
        directory,
        config.consensus,
    ));

    let app = with_review_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        strong = config.consensus.strong(),
        lean = config.consensus.lean(),
        "review consensus service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
