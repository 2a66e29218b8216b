use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState};
use crate::routes::with_ranking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use candidate_rank::config::AppConfig;
use candidate_rank::error::AppError;
use candidate_rank::ranking::RankingService;
use candidate_rank::telemetry;
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

    let catalog = load_catalog(&config.ranking, None)?;
    info!(
        jobs = catalog.len(),
        invalid = catalog.invalid().len(),
        "job catalog loaded"
    );
    let ranking_service = Arc::new(RankingService::new(
        catalog,
        config.ranking.shortlist_size,
        config.ranking.reference_year,
    ));

    let app = with_ranking_routes(ranking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate ranking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
