//! Event and magazine-page ranking for the RORO site.
//!
//! Aggregates are read through [`RecommendationSource`], scored against an
//! explicit "today", annotated with a localized reason, and trimmed to the top
//! [`RECOMMENDATION_LIMIT`] entries.

pub mod domain;
pub mod import;
pub mod query;
pub mod ranking;
pub mod reason;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    EventAggregate, EventRecord, EventSchedule, Favorite, MagazineRecommendation,
    PageViewAggregate, RankedRecommendation, TargetType, UserId, RECOMMENDATION_LIMIT,
};
pub use import::{ImportSummary, SnapshotImportError, SnapshotImporter};
pub use query::{EventAggregateQuery, MagazineViewQuery, SqlStatement, SqlValue, TableNames};
pub use ranking::{rank_events, rank_magazine_pages};
pub use reason::{ReasonCatalog, ReasonLocale};
pub use router::{recommendation_router, AccessDenied, AdminGate};
pub use scoring::{ScoreSignals, ScoringStrategy};
pub use service::{EventRecommendationRequest, RecommendationError, RecommendationService};
pub use store::{RecommendationSource, SourceError, SqliteStore};
