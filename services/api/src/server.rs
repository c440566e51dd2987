use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use roro::config::AppConfig;
use roro::error::AppError;
use roro::recommendations::{AdminGate, RecommendationService};
use roro::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(open_store(&config, args.database.as_deref())?);
    let service = Arc::new(RecommendationService::new(store, config.reason_locale));

    if config.access.admin_token.is_none() {
        warn!("APP_ADMIN_TOKEN is unset; magazine recommendations will refuse every request");
    }
    let admin = AdminGate::new(config.access.admin_token.clone());

    let app = with_recommendation_routes(service, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, locale = ?config.reason_locale, "recommendation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
