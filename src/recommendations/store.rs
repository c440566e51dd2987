use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use super::domain::{EventAggregate, EventRecord, Favorite, PageViewAggregate};
use super::query::{EventAggregateQuery, MagazineViewQuery, SqlStatement, SqlValue, TableNames};

/// Read access to the relational snapshot the rankings are computed from.
pub trait RecommendationSource: Send + Sync {
    fn event_aggregates(
        &self,
        query: &EventAggregateQuery,
    ) -> Result<Vec<EventAggregate>, SourceError>;
    fn page_views(&self, query: &MagazineViewQuery)
        -> Result<Vec<PageViewAggregate>, SourceError>;
}

/// Error enumeration for upstream data failures.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("column {column} holds out-of-range value {value}")]
    OutOfRange { column: &'static str, value: i128 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// SQLite-backed snapshot of events, favourites, and magazine page views.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    tables: TableNames,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, tables: TableNames) -> Result<Self, SourceError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, tables)
    }

    pub fn open_in_memory(tables: TableNames) -> Result<Self, SourceError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, tables)
    }

    /// Opens `path`, treating `:memory:` as a private in-memory database.
    pub fn open_configured(path: &str, tables: TableNames) -> Result<Self, SourceError> {
        if path == ":memory:" {
            Self::open_in_memory(tables)
        } else {
            Self::open(path, tables)
        }
    }

    fn from_connection(conn: Connection, tables: TableNames) -> Result<Self, SourceError> {
        let store = Self {
            conn: Mutex::new(conn),
            tables,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, SourceError> {
        self.conn
            .lock()
            .map_err(|_| SourceError::Unavailable("connection mutex poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), SourceError> {
        let TableNames {
            events,
            favorites,
            magazine_views,
        } = &self.tables;

        self.connection()?.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {events}(
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                event_date TEXT,
                visible INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS {favorites}(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                target_type TEXT NOT NULL,
                target_id INTEGER NOT NULL,
                UNIQUE(user_id, target_type, target_id)
            );
            CREATE TABLE IF NOT EXISTS {magazine_views}(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                issue_id INTEGER NOT NULL,
                page_id INTEGER NOT NULL,
                views INTEGER NOT NULL DEFAULT 0
            );"
        ))?;
        Ok(())
    }

    /// Inserts or replaces an event row.
    pub fn insert_event(&self, event: &EventRecord) -> Result<(), SourceError> {
        self.connection()?.execute(
            &format!(
                "INSERT INTO {}(id, name, event_date, visible) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                   name = excluded.name,
                   event_date = excluded.event_date,
                   visible = excluded.visible",
                self.tables.events
            ),
            params![event.id, event.name, event.event_date, event.visible],
        )?;
        Ok(())
    }

    /// Returns `false` when the member had already favourited the target.
    pub fn insert_favorite(&self, favorite: &Favorite) -> Result<bool, SourceError> {
        let inserted = self.connection()?.execute(
            &format!(
                "INSERT OR IGNORE INTO {}(user_id, target_type, target_id) VALUES (?1, ?2, ?3)",
                self.tables.favorites
            ),
            params![
                favorite.user_id.0,
                favorite.target_type.as_str(),
                favorite.target_id
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn record_page_view(
        &self,
        issue_id: i64,
        page_id: i64,
        views: u64,
    ) -> Result<(), SourceError> {
        let views = i64::try_from(views).map_err(|_| SourceError::OutOfRange {
            column: "views",
            value: i128::from(views),
        })?;
        self.connection()?.execute(
            &format!(
                "INSERT INTO {}(issue_id, page_id, views) VALUES (?1, ?2, ?3)",
                self.tables.magazine_views
            ),
            params![issue_id, page_id, views],
        )?;
        Ok(())
    }

    fn query_rows<T>(
        &self,
        statement: &SqlStatement,
        mut map: impl FnMut(&Row<'_>) -> Result<T, SourceError>,
    ) -> Result<Vec<T>, SourceError> {
        debug!(sql = %statement.sql, params = statement.params.len(), "executing recommendation query");

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&statement.sql)?;
        let values = statement.params.iter().map(to_sqlite_value);
        let mut rows = stmt.query(params_from_iter(values))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(map(row)?);
        }
        Ok(out)
    }
}

impl RecommendationSource for SqliteStore {
    fn event_aggregates(
        &self,
        query: &EventAggregateQuery,
    ) -> Result<Vec<EventAggregate>, SourceError> {
        let statement = query.statement(&self.tables);
        let personalised = query.user.is_some();

        self.query_rows(&statement, |row| {
            let favorites: i64 = row.get(3)?;
            let user_favorited = if personalised {
                let flag: i64 = row.get(4)?;
                Some(flag != 0)
            } else {
                None
            };

            Ok(EventAggregate {
                event_id: row.get(0)?,
                name: row.get(1)?,
                event_date: row.get(2)?,
                favorites: u32::try_from(favorites).map_err(|_| SourceError::OutOfRange {
                    column: "favorites",
                    value: i128::from(favorites),
                })?,
                user_favorited,
            })
        })
    }

    fn page_views(
        &self,
        query: &MagazineViewQuery,
    ) -> Result<Vec<PageViewAggregate>, SourceError> {
        let statement = query.statement(&self.tables);

        self.query_rows(&statement, |row| {
            let views: i64 = row.get(2)?;
            Ok(PageViewAggregate {
                issue_id: row.get(0)?,
                page_id: row.get(1)?,
                views: u64::try_from(views).map_err(|_| SourceError::OutOfRange {
                    column: "views",
                    value: i128::from(views),
                })?,
            })
        })
    }
}

fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Integer(number) => Value::Integer(*number),
        SqlValue::Text(text) => Value::Text(text.clone()),
    }
}
