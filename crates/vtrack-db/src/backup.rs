use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use sqlx::SqlitePool;

use crate::{DbError, StoreConfig};

/// A backup file found in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

/// `<db stem>_backup_<YYYYMMDD_HHMMSS>.db`
#[must_use]
pub fn backup_file_name(database_path: &Path, taken_at: NaiveDateTime) -> String {
    format!(
        "{}_backup_{}.db",
        database_stem(database_path),
        taken_at.format("%Y%m%d_%H%M%S")
    )
}

fn database_stem(database_path: &Path) -> String {
    database_path
        .file_stem()
        .map_or_else(|| "database".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Two backups within the same second get a numeric suffix instead of
/// overwriting each other.
async fn unused_backup_path(dir: &Path, file_name: &str) -> Result<PathBuf, DbError> {
    let candidate = dir.join(file_name);
    if !tokio::fs::try_exists(&candidate)
        .await
        .map_err(|e| DbError::io(&candidate, e))?
    {
        return Ok(candidate);
    }

    let stem = file_name.trim_end_matches(".db");
    for n in 1u32.. {
        let candidate = dir.join(format!("{stem}_{n}.db"));
        if !tokio::fs::try_exists(&candidate)
            .await
            .map_err(|e| DbError::io(&candidate, e))?
        {
            return Ok(candidate);
        }
    }
    Err(DbError::Backup(format!(
        "no free backup file name for {file_name}"
    )))
}

/// Write a consistent snapshot of the live database into the backup
/// directory using `VACUUM INTO`.
pub(crate) async fn write_backup(
    pool: &SqlitePool,
    config: &StoreConfig,
) -> Result<PathBuf, DbError> {
    tokio::fs::create_dir_all(&config.backup_dir)
        .await
        .map_err(|e| DbError::io(&config.backup_dir, e))?;

    let file_name = backup_file_name(&config.database_path, Local::now().naive_local());
    let target = unused_backup_path(&config.backup_dir, &file_name).await?;

    sqlx::query("VACUUM INTO ?")
        .bind(target.to_string_lossy().into_owned())
        .execute(pool)
        .await
        .map_err(|e| DbError::Backup(format!("{}: {e}", target.display())))?;

    tracing::info!(path = %target.display(), "database backed up");
    Ok(target)
}

pub(crate) async fn list_backups(config: &StoreConfig) -> Result<Vec<BackupFile>, DbError> {
    let dir = &config.backup_dir;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DbError::io(dir, e)),
    };

    let prefix = format!("{}_backup_", database_stem(&config.database_path));
    let mut backups = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| DbError::io(dir, e))? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.starts_with(&prefix) || !file_name.ends_with(".db") {
            continue;
        }
        let size_bytes = entry
            .metadata()
            .await
            .map_err(|e| DbError::io(&entry.path(), e))?
            .len();
        backups.push(BackupFile {
            path: entry.path(),
            file_name,
            size_bytes,
        });
    }

    // The timestamp in the name sorts lexicographically.
    backups.sort_by(|a, b| b.file_name.cmp(&a.file_name));
    Ok(backups)
}

/// Copy `backup_path` over `database_path` via a temp file in the target
/// directory, then remove journal side files left by the old database.
pub(crate) async fn replace_database_file(
    backup_path: &Path,
    database_path: &Path,
) -> Result<(), DbError> {
    let staging = side_file(database_path, "-restore");
    tokio::fs::copy(backup_path, &staging)
        .await
        .map_err(|e| DbError::io(&staging, e))?;
    tokio::fs::rename(&staging, database_path)
        .await
        .map_err(|e| DbError::io(database_path, e))?;

    for suffix in ["-journal", "-wal", "-shm"] {
        let stale = side_file(database_path, suffix);
        match tokio::fs::remove_file(&stale).await {
            Ok(()) => tracing::debug!(path = %stale.display(), "removed stale side file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(DbError::io(&stale, e)),
        }
    }
    Ok(())
}

fn side_file(database_path: &Path, suffix: &str) -> PathBuf {
    let mut name = database_path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
