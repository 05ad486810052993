use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use vtrack_core::{AppConfig, CoreError};

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

// Path relative to crates/vtrack-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Where the store lives on disk and how long to wait on it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
    pub acquire_timeout_secs: u64,
    pub busy_timeout_secs: u64,
}

impl StoreConfig {
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            backup_dir: backup_dir.into(),
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            database_path: config.database_path.clone(),
            backup_dir: config.backup_dir.clone(),
            acquire_timeout_secs: config.db_acquire_timeout_secs,
            busy_timeout_secs: config.db_busy_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("backup file not found: {0}")]
    BackupNotFound(String),
    #[error("backup failed: {0}")]
    Backup(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("filesystem error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// True when the store itself failed (as opposed to bad input or a
    /// missing record). The operation was rolled back and cannot be retried
    /// by fixing the input.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            DbError::Backup(_) | DbError::Io { .. } | DbError::Sqlx(_) | DbError::Migration(_)
        )
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DbError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Open a single-connection `SQLite` pool on `database_path`, creating the
/// file if needed.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(
    database_path: &Path,
    config: &StoreConfig,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .foreign_keys(true)
        // Rollback journal keeps the store a single file, so backups and
        // restores are plain file operations.
        .journal_mode(SqliteJournalMode::Delete)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
}

/// Create the database's parent directory if needed, then connect.
///
/// # Errors
///
/// Returns [`DbError::Io`] if the directory cannot be created or
/// [`DbError::Sqlx`] if the connection fails.
pub async fn open_pool(config: &StoreConfig) -> Result<SqlitePool, DbError> {
    if let Some(parent) = config
        .database_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::io(parent, e))?;
    }
    Ok(connect_pool(&config.database_path, config).await?)
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database; treat
    // absence as zero applied.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}


pub mod backup;
pub mod ingest;
pub mod performance;
pub mod scores;
pub mod store;
pub mod videos;

pub use backup::{backup_file_name, BackupFile};
pub use ingest::{ClearOutcome, IngestMode, UpsertOutcome};
pub use performance::{
    count_rows_for_date, latest_performance_date, list_daily_metrics, list_engagement_samples,
    top_videos_for_date, DailyPerformanceRow, TopVideoRow,
};
pub use scores::ScoreWriteOutcome;
pub use store::{BackupPoint, Store, WriteTx};
pub use videos::{
    existing_video_ids, get_video_details, list_video_labels, list_videos, search_videos,
    VideoDetailsRow, VideoLabelRow, VideoSummaryRow,
};
