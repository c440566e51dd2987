use metrics_exporter_prometheus::PrometheusHandle;
use roro::config::AppConfig;
use roro::error::AppError;
use roro::recommendations::{SqliteStore, TableNames};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured snapshot, letting a CLI flag override the path.
pub(crate) fn open_store(
    config: &AppConfig,
    database_override: Option<&Path>,
) -> Result<SqliteStore, AppError> {
    let tables = TableNames::with_prefix(&config.storage.table_prefix);
    let store = match database_override {
        Some(path) => SqliteStore::open(path, tables)?,
        None => SqliteStore::open_configured(&config.storage.database_path, tables)?,
    };

    info!(
        database = %database_override
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| config.storage.database_path.clone()),
        events_table = %store.tables().events,
        "recommendation store opened"
    );
    Ok(store)
}

pub(crate) fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    roro::recommendations::router::parse_date(raw)
}
