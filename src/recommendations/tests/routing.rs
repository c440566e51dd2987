use super::common::*;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::recommendations::router::{
    basic_events_handler, AccessDenied, AdminGate, EventRecommendationParams,
    RecommendationState,
};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn get_as_admin(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn basic_endpoint_returns_public_fields_only() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get("/api/v1/recommend-events?user_id=7&today=2026-04-01"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("array payload");
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries[0],
        json!({
            "id": 3,
            "name": "Event 3",
            "date": date_offset(45),
            "favorites": 1,
            "reason": "saved by 1 members, an upcoming highlight, so we recommend it",
        })
    );
    assert!(entries.iter().all(|entry| entry.get("score").is_none()));
}

#[tokio::test]
async fn advanced_endpoint_applies_advanced_formula() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get(
            "/api/v1/recommend-events-advanced?user_id=7&today=2026-04-01",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["id"], json!(2));
    assert_eq!(payload[1]["id"], json!(1));
}

#[tokio::test]
async fn non_integer_user_id_is_rejected() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get("/api/v1/recommend-events?user_id=abc"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_user_id_means_anonymous() {
    let (service, source) = service_for(sample_source());
    let state = RecommendationState {
        service,
        admin: Arc::new(AdminGate::default()),
    };

    let response = basic_events_handler(
        State(state),
        Query(EventRecommendationParams {
            user_id: Some(0),
            today: Some(today()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source.recorded_queries()[0].user, None);
}

#[tokio::test]
async fn magazine_endpoint_requires_credentials() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get("/api/v1/recommend-magazine"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        json!(AccessDenied::MissingCredentials.to_string())
    );
}

#[tokio::test]
async fn magazine_endpoint_rejects_wrong_token() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get_as_admin("/api/v1/recommend-magazine", "guess"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn magazine_endpoint_serves_administrators() {
    let router = router_for(sample_source());

    let response = router
        .oneshot(get_as_admin("/api/v1/recommend-magazine", ADMIN_TOKEN))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload[0],
        json!({
            "issue_id": 1,
            "page_id": 1,
            "views": 50,
            "reason": "Popular page viewed 50 times",
        })
    );
}

#[tokio::test]
async fn source_failure_maps_to_internal_error() {
    let router = router_for(OfflineSource);

    let response = router
        .oneshot(get("/api/v1/recommend-events"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));
}

#[test]
fn gate_without_configured_token_forbids_everyone() {
    let gate = AdminGate::new(None);
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        "Bearer anything".parse().expect("valid header"),
    );

    assert_eq!(gate.authorize(&headers), Err(AccessDenied::Forbidden));
}
