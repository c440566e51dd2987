use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::domain::{MagazineRecommendation, RankedRecommendation, UserId};
use super::query::{EventAggregateQuery, MagazineViewQuery};
use super::ranking::{rank_events, rank_magazine_pages};
use super::reason::ReasonLocale;
use super::scoring::ScoringStrategy;
use super::store::{RecommendationSource, SourceError};

/// Parameters of one event ranking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecommendationRequest {
    pub user: Option<UserId>,
    pub strategy: ScoringStrategy,
    pub today: NaiveDate,
}

/// Read-only service ranking events and magazine pages from a snapshot source.
pub struct RecommendationService<S> {
    source: Arc<S>,
    locale: ReasonLocale,
}

impl<S> RecommendationService<S>
where
    S: RecommendationSource + 'static,
{
    pub fn new(source: Arc<S>, locale: ReasonLocale) -> Self {
        Self { source, locale }
    }

    pub fn locale(&self) -> ReasonLocale {
        self.locale
    }

    /// Top events for the request's member and formula.
    pub fn recommend_events(
        &self,
        request: EventRecommendationRequest,
    ) -> Result<Vec<RankedRecommendation>, RecommendationError> {
        let query = EventAggregateQuery::for_user(request.user);
        let aggregates = self.source.event_aggregates(&query)?;
        debug!(
            candidates = aggregates.len(),
            strategy = request.strategy.label(),
            "scoring event candidates"
        );

        let ranked = rank_events(
            &aggregates,
            request.strategy,
            request.today,
            self.locale.catalog(),
        );

        info!(
            user = request.user.map(|user| user.0),
            strategy = request.strategy.label(),
            today = %request.today,
            returned = ranked.len(),
            "event recommendations ranked"
        );
        Ok(ranked)
    }

    /// Most viewed magazine pages.
    pub fn recommend_magazine(&self) -> Result<Vec<MagazineRecommendation>, RecommendationError> {
        let pages = self.source.page_views(&MagazineViewQuery)?;
        let ranked = rank_magazine_pages(&pages, self.locale.catalog());

        info!(
            pages = pages.len(),
            returned = ranked.len(),
            "magazine recommendations ranked"
        );
        Ok(ranked)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Source(#[from] SourceError),
}
