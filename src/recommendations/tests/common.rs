use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::recommendations::domain::{EventAggregate, PageViewAggregate, UserId};
use crate::recommendations::query::{EventAggregateQuery, MagazineViewQuery};
use crate::recommendations::reason::ReasonLocale;
use crate::recommendations::router::{recommendation_router, AdminGate};
use crate::recommendations::service::RecommendationService;
use crate::recommendations::store::{RecommendationSource, SourceError};

pub(super) const ADMIN_TOKEN: &str = "editor-secret";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date")
}

pub(super) fn date_offset(days: i64) -> String {
    (today() + Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub(super) fn aggregate(id: i64, favorites: u32, days: Option<i64>) -> EventAggregate {
    EventAggregate {
        event_id: id,
        name: format!("Event {id}"),
        event_date: days.map(date_offset),
        favorites,
        user_favorited: None,
    }
}

pub(super) fn page(issue_id: i64, page_id: i64, views: u64) -> PageViewAggregate {
    PageViewAggregate {
        issue_id,
        page_id,
        views,
    }
}

/// Snapshot held in memory; member favourites are applied per query.
#[derive(Default)]
pub(super) struct MemorySource {
    pub(super) events: Vec<EventAggregate>,
    pub(super) member_favorites: Vec<(UserId, i64)>,
    pub(super) pages: Vec<PageViewAggregate>,
    pub(super) queries: Mutex<Vec<EventAggregateQuery>>,
}

impl MemorySource {
    pub(super) fn recorded_queries(&self) -> Vec<EventAggregateQuery> {
        self.queries.lock().expect("query log poisoned").clone()
    }
}

impl RecommendationSource for MemorySource {
    fn event_aggregates(
        &self,
        query: &EventAggregateQuery,
    ) -> Result<Vec<EventAggregate>, SourceError> {
        self.queries.lock().expect("query log poisoned").push(*query);
        Ok(self
            .events
            .iter()
            .cloned()
            .map(|mut event| {
                event.user_favorited = query.user.map(|user| {
                    self.member_favorites
                        .iter()
                        .any(|(member, target)| *member == user && *target == event.event_id)
                });
                event
            })
            .collect())
    }

    fn page_views(
        &self,
        _query: &MagazineViewQuery,
    ) -> Result<Vec<PageViewAggregate>, SourceError> {
        Ok(self.pages.clone())
    }
}

pub(super) struct OfflineSource;

impl RecommendationSource for OfflineSource {
    fn event_aggregates(
        &self,
        _query: &EventAggregateQuery,
    ) -> Result<Vec<EventAggregate>, SourceError> {
        Err(SourceError::Unavailable("database offline".to_string()))
    }

    fn page_views(
        &self,
        _query: &MagazineViewQuery,
    ) -> Result<Vec<PageViewAggregate>, SourceError> {
        Err(SourceError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn sample_source() -> MemorySource {
    MemorySource {
        events: vec![
            aggregate(1, 3, Some(10)),
            aggregate(2, 0, Some(-3)),
            aggregate(3, 1, Some(45)),
            aggregate(4, 2, None),
        ],
        member_favorites: vec![(UserId(7), 2)],
        pages: vec![page(1, 1, 50), page(1, 2, 30), page(2, 1, 30)],
        queries: Mutex::new(Vec::new()),
    }
}

pub(super) fn service_for<S>(source: S) -> (Arc<RecommendationService<S>>, Arc<S>)
where
    S: RecommendationSource + 'static,
{
    let source = Arc::new(source);
    let service = Arc::new(RecommendationService::new(
        source.clone(),
        ReasonLocale::English,
    ));
    (service, source)
}

pub(super) fn router_for<S>(source: S) -> axum::Router
where
    S: RecommendationSource + 'static,
{
    let (service, _) = service_for(source);
    recommendation_router(service, AdminGate::new(Some(ADMIN_TOKEN.to_string())))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
