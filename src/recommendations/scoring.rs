use serde::{Deserialize, Serialize};

/// Days on either side of today that still earn the advanced proximity bonus.
pub const PROXIMITY_WINDOW_DAYS: i64 = 30;

/// Formula used to rank events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Popularity minus signed days since the event.
    #[default]
    Basic,
    /// Heavier popularity and personal weights plus a bounded proximity window.
    Advanced,
}

/// Inputs the formulas read for one candidate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSignals {
    pub favorites: u32,
    pub user_favorited: bool,
    /// `None` when the event has no usable date.
    pub days_until: Option<i64>,
}

impl ScoreSignals {
    pub fn days_since(&self) -> Option<i64> {
        self.days_until.map(|days| -days)
    }
}

impl ScoringStrategy {
    pub fn label(self) -> &'static str {
        match self {
            ScoringStrategy::Basic => "basic",
            ScoringStrategy::Advanced => "advanced",
        }
    }

    pub fn score(self, signals: &ScoreSignals) -> i64 {
        match self {
            ScoringStrategy::Basic => basic_score(signals),
            ScoringStrategy::Advanced => advanced_score(signals),
        }
    }
}

fn basic_score(signals: &ScoreSignals) -> i64 {
    let popularity = i64::from(signals.favorites) * 10;
    let recency = signals.days_since().unwrap_or(0);
    let personal = if signals.user_favorited { 50 } else { 0 };
    popularity - recency + personal
}

fn advanced_score(signals: &ScoreSignals) -> i64 {
    let popularity = i64::from(signals.favorites) * 15;
    let personal = if signals.user_favorited { 70 } else { 0 };
    let (proximity, distance) = match signals.days_until {
        Some(days_until) => {
            let distance = days_until.saturating_abs();
            ((PROXIMITY_WINDOW_DAYS - distance).max(0) * 5, distance)
        }
        None => (0, 0),
    };
    popularity + personal + proximity - distance
}
