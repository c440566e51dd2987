use chrono::NaiveDate;
use roro::recommendations::{
    EventRecommendationRequest, ReasonLocale, RecommendationService, ScoringStrategy,
    SnapshotImporter, SqliteStore, TableNames, UserId, RECOMMENDATION_LIMIT,
};
use std::io::Cursor;
use std::sync::Arc;

const EVENTS_CSV: &str = "id,name,event_date,visible
1,Dog Run Festival,2026-04-11,1
2,Cat Cafe Night,2026-03-29,1
3,Pet Photo Walk,2026-06-15,1
4,Vet Q&A Session,2025-11-20,1
5,Members Only Preview,2026-04-03,0
6,Grooming Workshop,2026-04-20 10:00:00,1
7,Adoption Day,TBA,1
";

const FAVORITES_CSV: &str = "user_id,target_type,target_id
10,event,1
11,event,1
12,event,1
10,event,2
11,event,5
12,spot,3
13,event,6
";

const VIEWS_CSV: &str = "issue_id,page_id,views
1,1,20
1,2,30
2,1,30
1,1,30
2,2,10
3,1,5
3,2,1
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date")
}

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory(TableNames::with_prefix("wp_")).expect("store opens");
    let mut importer = SnapshotImporter::new(&store);
    importer
        .events_from_reader(Cursor::new(EVENTS_CSV))
        .expect("events import");
    importer
        .favorites_from_reader(Cursor::new(FAVORITES_CSV))
        .expect("favorites import");
    importer
        .page_views_from_reader(Cursor::new(VIEWS_CSV))
        .expect("views import");
    store
}

fn service() -> RecommendationService<SqliteStore> {
    RecommendationService::new(Arc::new(seeded_store()), ReasonLocale::English)
}

#[test]
fn basic_ranking_over_imported_snapshot() {
    let ranked = service()
        .recommend_events(EventRecommendationRequest {
            user: None,
            strategy: ScoringStrategy::Basic,
            today: today(),
        })
        .expect("ranking succeeds");

    // Pet Photo Walk 75, Dog Run 40, Grooming 29, Cat Cafe 7, Adoption Day 0.
    assert_eq!(ranked.len(), RECOMMENDATION_LIMIT);
    assert_eq!(
        ranked.iter().map(|entry| entry.id).collect::<Vec<_>>(),
        vec![3, 1, 6, 2, 7]
    );
    assert_eq!(
        ranked.iter().map(|entry| entry.score).collect::<Vec<_>>(),
        vec![75, 40, 29, 7, 0]
    );
    assert!(ranked.iter().all(|entry| entry.id != 5), "hidden event excluded");
    assert_eq!(ranked[4].reason, "scheduled for TBA, so we recommend it");
}

#[test]
fn advanced_ranking_personalises_for_member() {
    let ranked = service()
        .recommend_events(EventRecommendationRequest {
            user: Some(UserId(10)),
            strategy: ScoringStrategy::Advanced,
            today: today(),
        })
        .expect("ranking succeeds");

    // Dog Run: 45 + 70 + 100 - 10 = 205; Cat Cafe: 15 + 70 + 135 - 3 = 217.
    assert_eq!(ranked[0].id, 2);
    assert_eq!(ranked[0].score, 217);
    assert_eq!(ranked[1].id, 1);
    assert_eq!(ranked[1].score, 205);
    assert_eq!(
        ranked[1].reason,
        "you saved this event, saved by 3 members, happening soon, so we recommend it"
    );
}

#[test]
fn magazine_ranking_sums_repeat_rows() {
    let ranked = service().recommend_magazine().expect("ranking succeeds");

    assert_eq!(
        ranked
            .iter()
            .map(|entry| (entry.issue_id, entry.page_id, entry.views))
            .collect::<Vec<_>>(),
        vec![(1, 1, 50), (1, 2, 30), (2, 1, 30), (2, 2, 10), (3, 1, 5)]
    );
}

#[test]
fn repeated_requests_are_identical() {
    let service = service();
    let request = EventRecommendationRequest {
        user: Some(UserId(11)),
        strategy: ScoringStrategy::Advanced,
        today: today(),
    };

    let first = service.recommend_events(request).expect("first ranking");
    let second = service.recommend_events(request).expect("second ranking");

    assert_eq!(first, second);
}

#[test]
fn empty_store_ranks_to_empty_lists() {
    let store = SqliteStore::open_in_memory(TableNames::default()).expect("store opens");
    let service = RecommendationService::new(Arc::new(store), ReasonLocale::Japanese);

    let events = service
        .recommend_events(EventRecommendationRequest {
            user: Some(UserId(1)),
            strategy: ScoringStrategy::Basic,
            today: today(),
        })
        .expect("ranking succeeds");

    assert!(events.is_empty());
    assert!(service.recommend_magazine().expect("ranking succeeds").is_empty());
}
