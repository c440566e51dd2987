use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::warn;

use super::domain::UserId;
use super::scoring::ScoringStrategy;
use super::service::{EventRecommendationRequest, RecommendationService};
use super::store::RecommendationSource;

/// Administrator capability check for restricted endpoints.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    token: Option<String>,
}

/// Why a request was refused the administrator capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("administrator credentials required")]
    MissingCredentials,
    #[error("administrator capability required")]
    Forbidden,
}

impl AccessDenied {
    pub fn status(self) -> StatusCode {
        match self {
            AccessDenied::MissingCredentials => StatusCode::UNAUTHORIZED,
            AccessDenied::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl AdminGate {
    /// With no token configured nobody holds the capability.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AccessDenied> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AccessDenied::MissingCredentials)?;

        match &self.token {
            Some(expected) if constant_time_eq(expected.as_bytes(), presented.as_bytes()) => {
                Ok(())
            }
            _ => Err(AccessDenied::Forbidden),
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Shared handler state.
pub struct RecommendationState<S> {
    pub service: Arc<RecommendationService<S>>,
    pub admin: Arc<AdminGate>,
}

impl<S> Clone for RecommendationState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            admin: Arc::clone(&self.admin),
        }
    }
}

/// Query string accepted by the event endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct EventRecommendationParams {
    #[serde(default, deserialize_with = "deserialize_optional_user_id")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub today: Option<NaiveDate>,
}

/// Router builder exposing the ranking endpoints.
pub fn recommendation_router<S>(
    service: Arc<RecommendationService<S>>,
    admin: AdminGate,
) -> Router
where
    S: RecommendationSource + 'static,
{
    let state = RecommendationState {
        service,
        admin: Arc::new(admin),
    };

    Router::new()
        .route("/api/v1/recommend-events", get(basic_events_handler::<S>))
        .route(
            "/api/v1/recommend-events-advanced",
            get(advanced_events_handler::<S>),
        )
        .route("/api/v1/recommend-magazine", get(magazine_handler::<S>))
        .with_state(state)
}

pub(crate) async fn basic_events_handler<S>(
    State(state): State<RecommendationState<S>>,
    Query(params): Query<EventRecommendationParams>,
) -> Response
where
    S: RecommendationSource + 'static,
{
    respond_with_events(&state, params, ScoringStrategy::Basic)
}

pub(crate) async fn advanced_events_handler<S>(
    State(state): State<RecommendationState<S>>,
    Query(params): Query<EventRecommendationParams>,
) -> Response
where
    S: RecommendationSource + 'static,
{
    respond_with_events(&state, params, ScoringStrategy::Advanced)
}

fn respond_with_events<S>(
    state: &RecommendationState<S>,
    params: EventRecommendationParams,
    strategy: ScoringStrategy,
) -> Response
where
    S: RecommendationSource + 'static,
{
    let request = EventRecommendationRequest {
        user: UserId::from_raw(params.user_id),
        strategy,
        today: params.today.unwrap_or_else(|| Local::now().date_naive()),
    };

    match state.service.recommend_events(request) {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => {
            warn!(%error, strategy = strategy.label(), "event recommendation failed");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn magazine_handler<S>(
    State(state): State<RecommendationState<S>>,
    headers: HeaderMap,
) -> Response
where
    S: RecommendationSource + 'static,
{
    if let Err(denied) = state.admin.authorize(&headers) {
        let payload = json!({ "error": denied.to_string() });
        return (denied.status(), axum::Json(payload)).into_response();
    }

    match state.service.recommend_magazine() {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => {
            warn!(%error, "magazine recommendation failed");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

fn deserialize_optional_user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("user_id '{value}' is not an integer")))
        })
        .transpose()
}
