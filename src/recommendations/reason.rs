use super::domain::EventSchedule;
use super::scoring::PROXIMITY_WINDOW_DAYS;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Language used for human-readable ranking reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReasonLocale {
    #[default]
    Japanese,
    English,
}

impl ReasonLocale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja_jp" | "ja-jp" | "japanese" => Some(Self::Japanese),
            "en" | "en_us" | "en-us" | "english" => Some(Self::English),
            _ => None,
        }
    }

    pub fn catalog(self) -> &'static ReasonCatalog {
        match self {
            ReasonLocale::Japanese => &JAPANESE,
            ReasonLocale::English => &ENGLISH,
        }
    }
}

/// Phrase table for one locale. `{n}` and `{date}` are substituted.
#[derive(Debug)]
pub struct ReasonCatalog {
    pub personal: &'static str,
    pub popularity: &'static str,
    pub upcoming_soon: &'static str,
    pub upcoming_popular: &'static str,
    pub recently_held: &'static str,
    pub raw_date: &'static str,
    pub event_fallback: &'static str,
    pub separator: &'static str,
    pub suffix: &'static str,
    pub page_views: &'static str,
    pub page_fallback: &'static str,
}

static JAPANESE: ReasonCatalog = ReasonCatalog {
    personal: "あなたがお気に入り登録しています",
    popularity: "{n}人がお気に入り登録",
    upcoming_soon: "まもなく開催",
    upcoming_popular: "開催予定の注目イベント",
    recently_held: "最近開催されました",
    raw_date: "開催日: {date}",
    event_fallback: "RORO編集部のおすすめイベントです",
    separator: "、",
    suffix: "のためおすすめです",
    page_views: "{n}回閲覧された人気ページです",
    page_fallback: "編集部のおすすめページです",
};

static ENGLISH: ReasonCatalog = ReasonCatalog {
    personal: "you saved this event",
    popularity: "saved by {n} members",
    upcoming_soon: "happening soon",
    upcoming_popular: "an upcoming highlight",
    recently_held: "recently held",
    raw_date: "scheduled for {date}",
    event_fallback: "Recommended by the RORO editors",
    separator: ", ",
    suffix: ", so we recommend it",
    page_views: "Popular page viewed {n} times",
    page_fallback: "Editor's pick",
};

/// Inputs that decide which clauses appear in an event reason.
#[derive(Debug, Clone, Copy)]
pub struct EventReasonInput<'a> {
    pub user_favorited: bool,
    pub favorites: u32,
    pub schedule: &'a EventSchedule,
    pub today: NaiveDate,
}

impl ReasonCatalog {
    pub fn event_reason(&self, input: EventReasonInput<'_>) -> String {
        let mut clauses: Vec<String> = Vec::new();

        if input.user_favorited {
            clauses.push(self.personal.to_string());
        }

        if input.favorites > 0 {
            clauses.push(
                self.popularity
                    .replace("{n}", &input.favorites.to_string()),
            );
        }

        if let Some(clause) = self.date_clause(input.schedule, input.today) {
            clauses.push(clause);
        }

        if clauses.is_empty() {
            return self.event_fallback.to_string();
        }

        let mut reason = clauses.join(self.separator);
        reason.push_str(self.suffix);
        reason
    }

    fn date_clause(&self, schedule: &EventSchedule, today: NaiveDate) -> Option<String> {
        match schedule {
            EventSchedule::Missing => None,
            EventSchedule::Unparsed(raw) => Some(self.raw_date.replace("{date}", raw)),
            EventSchedule::On(date) => {
                let days_until = (*date - today).num_days();
                if days_until >= 0 {
                    if days_until <= PROXIMITY_WINDOW_DAYS {
                        Some(self.upcoming_soon.to_string())
                    } else {
                        Some(self.upcoming_popular.to_string())
                    }
                } else if days_until >= -PROXIMITY_WINDOW_DAYS {
                    Some(self.recently_held.to_string())
                } else {
                    None
                }
            }
        }
    }

    pub fn page_reason(&self, views: u64) -> String {
        if views > 0 {
            self.page_views.replace("{n}", &views.to_string())
        } else {
            self.page_fallback.to_string()
        }
    }
}
