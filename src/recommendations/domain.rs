use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Maximum number of items any ranking returns.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Identifier of a signed-in site member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Anonymous visitors arrive as `0` or without an id; neither personalises.
    pub fn from_raw(raw: Option<i64>) -> Option<Self> {
        raw.filter(|value| *value > 0).map(Self)
    }
}

/// Discriminator for what a favourite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Event,
    Spot,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Event => "event",
            TargetType::Spot => "spot",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "event" => Some(Self::Event),
            "spot" => Some(Self::Spot),
            _ => None,
        }
    }
}

/// A member's bookmark of an event or travel spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub target_type: TargetType,
    pub target_id: i64,
}

/// Event row as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    pub event_date: Option<String>,
    pub visible: bool,
}

/// One visible event with its favourite aggregate.
///
/// `user_favorited` is only populated when the aggregate was computed for a
/// specific member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAggregate {
    pub event_id: i64,
    pub name: String,
    pub event_date: Option<String>,
    pub favorites: u32,
    pub user_favorited: Option<bool>,
}

impl EventAggregate {
    pub fn is_user_favorite(&self) -> bool {
        self.user_favorited.unwrap_or(false)
    }

    pub fn schedule(&self) -> EventSchedule {
        EventSchedule::from_raw(self.event_date.as_deref())
    }
}

/// Interpretation of the free-form date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSchedule {
    Missing,
    Unparsed(String),
    On(NaiveDate),
}

impl EventSchedule {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::Missing;
        };

        match parse_event_date(raw) {
            Some(date) => Self::On(date),
            None => Self::Unparsed(raw.to_string()),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            EventSchedule::On(date) => Some(*date),
            EventSchedule::Missing | EventSchedule::Unparsed(_) => None,
        }
    }

    /// Whole days from `today` until the event; negative once it has passed.
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.date().map(|date| (date - today).num_days())
    }
}

fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Ranked event returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRecommendation {
    pub id: i64,
    pub name: String,
    pub date: Option<String>,
    pub favorites: u32,
    #[serde(skip)]
    pub score: i64,
    pub reason: String,
}

/// View total for one page of one magazine issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewAggregate {
    pub issue_id: i64,
    pub page_id: i64,
    pub views: u64,
}

/// Ranked magazine page returned to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagazineRecommendation {
    pub issue_id: i64,
    pub page_id: i64,
    pub views: u64,
    pub reason: String,
}
