use crate::cli::ServeArgs;
use crate::infra::{load_dataset, train_predictor, AppState, SafetyState};
use crate::routes::with_safety_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use salmeen::config::AppConfig;
use salmeen::error::AppError;
use salmeen::telemetry;
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

    let today = Local::now().date_naive();
    let dataset = load_dataset(&config.dataset, today)?;
    let predictor = train_predictor(&dataset, &config.dataset, today);
    let safety_state = SafetyState::new(dataset, predictor, config.dataset.window_days);

    let app = with_safety_routes(safety_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "driving safety service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
