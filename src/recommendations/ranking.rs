use std::cmp::Ordering;

use chrono::NaiveDate;

use super::domain::{
    EventAggregate, MagazineRecommendation, PageViewAggregate, RankedRecommendation,
    RECOMMENDATION_LIMIT,
};
use super::reason::{EventReasonInput, ReasonCatalog};
use super::scoring::{ScoreSignals, ScoringStrategy};

struct Candidate {
    recommendation: RankedRecommendation,
    sort_date: Option<NaiveDate>,
}

/// Scores every aggregate against `today` and keeps the top entries.
pub fn rank_events(
    aggregates: &[EventAggregate],
    strategy: ScoringStrategy,
    today: NaiveDate,
    catalog: &ReasonCatalog,
) -> Vec<RankedRecommendation> {
    let mut candidates: Vec<Candidate> = aggregates
        .iter()
        .map(|aggregate| {
            let schedule = aggregate.schedule();
            let user_favorited = aggregate.is_user_favorite();
            let signals = ScoreSignals {
                favorites: aggregate.favorites,
                user_favorited,
                days_until: schedule.days_until(today),
            };
            let reason = catalog.event_reason(EventReasonInput {
                user_favorited,
                favorites: aggregate.favorites,
                schedule: &schedule,
                today,
            });

            Candidate {
                recommendation: RankedRecommendation {
                    id: aggregate.event_id,
                    name: aggregate.name.clone(),
                    date: aggregate.event_date.clone(),
                    favorites: aggregate.favorites,
                    score: strategy.score(&signals),
                    reason,
                },
                sort_date: schedule.date(),
            }
        })
        .collect();

    candidates.sort_by(compare_candidates);
    candidates.truncate(RECOMMENDATION_LIMIT);
    candidates
        .into_iter()
        .map(|candidate| candidate.recommendation)
        .collect()
}

fn compare_candidates(left: &Candidate, right: &Candidate) -> Ordering {
    let (a, b) = (&left.recommendation, &right.recommendation);
    b.score
        .cmp(&a.score)
        .then_with(|| b.favorites.cmp(&a.favorites))
        // `None` orders below any date, so undated events sink.
        .then_with(|| right.sort_date.cmp(&left.sort_date))
}

/// Orders pages by views, keeping store order among equal counts.
pub fn rank_magazine_pages(
    pages: &[PageViewAggregate],
    catalog: &ReasonCatalog,
) -> Vec<MagazineRecommendation> {
    let mut ordered: Vec<&PageViewAggregate> = pages.iter().collect();
    ordered.sort_by(|a, b| b.views.cmp(&a.views));

    ordered
        .into_iter()
        .take(RECOMMENDATION_LIMIT)
        .map(|page| MagazineRecommendation {
            issue_id: page.issue_id,
            page_id: page.page_id,
            views: page.views,
            reason: catalog.page_reason(page.views),
        })
        .collect()
}
