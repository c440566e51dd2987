use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use roro::recommendations::{
    recommendation_router, AdminGate, RecommendationService, RecommendationSource,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_recommendation_routes<S>(
    service: Arc<RecommendationService<S>>,
    admin: AdminGate,
) -> axum::Router
where
    S: RecommendationSource + 'static,
{
    recommendation_router(service, admin)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use roro::recommendations::{
        EventRecord, ReasonLocale, SqliteStore, TableNames,
    };
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn seeded_service() -> Arc<RecommendationService<SqliteStore>> {
        let store = SqliteStore::open_in_memory(TableNames::default()).expect("store opens");
        store
            .insert_event(&EventRecord {
                id: 1,
                name: "Dog Run Festival".to_string(),
                event_date: Some("2026-05-01".to_string()),
                visible: true,
            })
            .expect("event inserted");
        Arc::new(RecommendationService::new(
            Arc::new(store),
            ReasonLocale::English,
        ))
    }

    fn router(ready: bool) -> axum::Router {
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(handle),
        };
        with_recommendation_routes(seeded_service(), AdminGate::default())
            .layer(Extension(state))
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = router(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_and_recommendations_share_one_router() {
        let app = router(true);

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(health.status(), StatusCode::OK);

        let events = app
            .oneshot(
                Request::get("/api/v1/recommend-events?today=2026-04-25")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(events.status(), StatusCode::OK);
        let body = axum::body::to_bytes(events.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload[0]["name"], json!("Dog Run Festival"));
        assert_eq!(
            payload[0]["reason"],
            json!("happening soon, so we recommend it")
        );
    }
}
