use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::domain::{EventRecord, Favorite, TargetType, UserId};
use super::store::{SourceError, SqliteStore};

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow {
        file: &'static str,
        record: usize,
        detail: String,
    },
    Store(SourceError),
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read snapshot export: {}", err),
            SnapshotImportError::Csv(err) => write!(f, "invalid snapshot CSV data: {}", err),
            SnapshotImportError::InvalidRow {
                file,
                record,
                detail,
            } => write!(f, "{file} record {record}: {detail}"),
            SnapshotImportError::Store(err) => {
                write!(f, "could not write snapshot into the store: {}", err)
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::InvalidRow { .. } => None,
            SnapshotImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<SourceError> for SnapshotImportError {
    fn from(err: SourceError) -> Self {
        Self::Store(err)
    }
}

/// Row counts written by an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub events: usize,
    pub favorites: usize,
    pub duplicate_favorites: usize,
    pub page_views: usize,
}

/// Loads CSV exports of the site tables into a [`SqliteStore`].
pub struct SnapshotImporter<'a> {
    store: &'a SqliteStore,
    summary: ImportSummary,
}

impl<'a> SnapshotImporter<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self {
            store,
            summary: ImportSummary::default(),
        }
    }

    pub fn summary(&self) -> ImportSummary {
        self.summary
    }

    pub fn events_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SnapshotImportError> {
        self.events_from_reader(File::open(path)?)
    }

    pub fn favorites_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), SnapshotImportError> {
        self.favorites_from_reader(File::open(path)?)
    }

    pub fn page_views_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), SnapshotImportError> {
        self.page_views_from_reader(File::open(path)?)
    }

    /// Columns: `id,name,event_date,visible`.
    pub fn events_from_reader<R: Read>(&mut self, reader: R) -> Result<(), SnapshotImportError> {
        for (index, row) in csv_reader(reader).deserialize::<EventRow>().enumerate() {
            let row = row?;
            let visible = parse_visibility(row.visible.as_deref()).ok_or_else(|| {
                SnapshotImportError::InvalidRow {
                    file: "events",
                    record: index + 1,
                    detail: format!(
                        "visible must be one of 1/0/true/false/yes/no, got '{}'",
                        row.visible.as_deref().unwrap_or_default()
                    ),
                }
            })?;

            self.store.insert_event(&EventRecord {
                id: row.id,
                name: row.name,
                event_date: row.event_date,
                visible,
            })?;
            self.summary.events += 1;
        }
        Ok(())
    }

    /// Columns: `user_id,target_type,target_id`.
    pub fn favorites_from_reader<R: Read>(
        &mut self,
        reader: R,
    ) -> Result<(), SnapshotImportError> {
        for (index, row) in csv_reader(reader).deserialize::<FavoriteRow>().enumerate() {
            let row = row?;
            let target_type = TargetType::parse(&row.target_type).ok_or_else(|| {
                SnapshotImportError::InvalidRow {
                    file: "favorites",
                    record: index + 1,
                    detail: format!("unknown target_type '{}'", row.target_type),
                }
            })?;

            let inserted = self.store.insert_favorite(&Favorite {
                user_id: UserId(row.user_id),
                target_type,
                target_id: row.target_id,
            })?;
            if inserted {
                self.summary.favorites += 1;
            } else {
                self.summary.duplicate_favorites += 1;
            }
        }
        Ok(())
    }

    /// Columns: `issue_id,page_id,views`.
    pub fn page_views_from_reader<R: Read>(
        &mut self,
        reader: R,
    ) -> Result<(), SnapshotImportError> {
        for row in csv_reader(reader).deserialize::<PageViewRow>() {
            let row = row?;
            self.store
                .record_page_view(row.issue_id, row.page_id, row.views)?;
            self.summary.page_views += 1;
        }
        Ok(())
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: i64,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    event_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    visible: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FavoriteRow {
    user_id: i64,
    target_type: String,
    target_id: i64,
}

#[derive(Debug, Deserialize)]
struct PageViewRow {
    issue_id: i64,
    page_id: i64,
    views: u64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Blank cells mean visible.
fn parse_visibility(raw: Option<&str>) -> Option<bool> {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        None => Some(true),
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        },
    }
}
