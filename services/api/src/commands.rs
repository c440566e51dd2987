use crate::infra::open_store;
use chrono::{Local, NaiveDate};
use clap::Args;
use roro::config::AppConfig;
use roro::error::AppError;
use roro::recommendations::{
    EventRecommendationRequest, MagazineRecommendation, RankedRecommendation,
    RecommendationService, ScoringStrategy, SnapshotImporter, UserId,
};
use roro::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct StoreArgs {
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendEventsArgs {
    /// Member whose favourites personalise the ranking
    #[arg(long)]
    pub(crate) user_id: Option<i64>,
    /// Use the advanced proximity-window formula
    #[arg(long)]
    pub(crate) advanced: bool,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Events export (id,name,event_date,visible)
    #[arg(long)]
    pub(crate) events: Option<PathBuf>,
    /// Favourites export (user_id,target_type,target_id)
    #[arg(long)]
    pub(crate) favorites: Option<PathBuf>,
    /// Magazine page-view export (issue_id,page_id,views)
    #[arg(long)]
    pub(crate) views: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

fn cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_recommend_events(args: RecommendEventsArgs) -> Result<(), AppError> {
    let config = cli_config()?;
    let store = open_store(&config, args.store.database.as_deref())?;
    let service = RecommendationService::new(Arc::new(store), config.reason_locale);

    let strategy = if args.advanced {
        ScoringStrategy::Advanced
    } else {
        ScoringStrategy::Basic
    };
    let request = EventRecommendationRequest {
        user: UserId::from_raw(args.user_id),
        strategy,
        today: args.today.unwrap_or_else(|| Local::now().date_naive()),
    };

    let ranked = service.recommend_events(request)?;
    render_event_ranking(&request, &ranked);
    Ok(())
}

pub(crate) fn run_recommend_magazine(args: StoreArgs) -> Result<(), AppError> {
    let config = cli_config()?;
    let store = open_store(&config, args.database.as_deref())?;
    let service = RecommendationService::new(Arc::new(store), config.reason_locale);

    let ranked = service.recommend_magazine()?;
    render_magazine_ranking(&ranked);
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = cli_config()?;
    let store = open_store(&config, args.store.database.as_deref())?;
    let mut importer = SnapshotImporter::new(&store);

    if let Some(path) = args.events {
        importer.events_from_path(path)?;
    }
    if let Some(path) = args.favorites {
        importer.favorites_from_path(path)?;
    }
    if let Some(path) = args.views {
        importer.page_views_from_path(path)?;
    }

    let summary = importer.summary();
    println!("Snapshot import complete");
    println!("- events: {}", summary.events);
    println!(
        "- favourites: {} ({} duplicates skipped)",
        summary.favorites, summary.duplicate_favorites
    );
    println!("- page-view rows: {}", summary.page_views);
    Ok(())
}

fn render_event_ranking(request: &EventRecommendationRequest, ranked: &[RankedRecommendation]) {
    println!(
        "Event recommendations ({} formula, evaluated {})",
        request.strategy.label(),
        request.today
    );
    match request.user {
        Some(user) => println!("Personalised for member {}", user.0),
        None => println!("Anonymous ranking"),
    }

    if ranked.is_empty() {
        println!("\nNo visible events");
        return;
    }

    println!();
    for (position, entry) in ranked.iter().enumerate() {
        println!(
            "{}. {} (#{}) | date {} | {} favourites | score {}",
            position + 1,
            entry.name,
            entry.id,
            entry.date.as_deref().unwrap_or("-"),
            entry.favorites,
            entry.score
        );
        println!("   {}", entry.reason);
    }
}

fn render_magazine_ranking(ranked: &[MagazineRecommendation]) {
    println!("Magazine page recommendations");

    if ranked.is_empty() {
        println!("\nNo page views recorded");
        return;
    }

    println!();
    for (position, entry) in ranked.iter().enumerate() {
        println!(
            "{}. issue {} page {} | {} views | {}",
            position + 1,
            entry.issue_id,
            entry.page_id,
            entry.views,
            entry.reason
        );
    }
}
