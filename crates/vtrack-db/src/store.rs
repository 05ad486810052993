//! The store handle and the write-transaction guard that ties every write to
//! exactly one backup.

use std::path::{Path, PathBuf};

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::{backup, connect_pool, open_pool, run_migrations, DbError, StoreConfig};

/// When a write transaction snapshots the database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPoint {
    /// Before the transaction opens. Used for destructive writes (clearing a
    /// date, overwriting scores) so the prior state is recoverable.
    BeforeBegin,
    /// After a successful commit. Used for ingestion so the backup holds the
    /// newly written data.
    AfterCommit,
}

/// Handle on the `SQLite` store.
///
/// All writes go through [`Store::begin_write`]; reads borrow the pool via
/// [`Store::pool`], which transparently reopens a connection that was
/// closed by a restore.
#[derive(Debug)]
pub struct Store {
    pool: SqlitePool,
    config: StoreConfig,
}

impl Store {
    /// Open (creating if needed) the database and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the parent directory cannot be created,
    /// [`DbError::Sqlx`] if the connection fails, or [`DbError::Migration`]
    /// if a migration fails.
    pub async fn open(config: StoreConfig) -> Result<Self, DbError> {
        let pool = open_pool(&config).await?;
        let applied = run_migrations(&pool).await?;
        tracing::debug!(
            path = %config.database_path.display(),
            applied,
            "store opened"
        );

        Ok(Self { pool, config })
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Borrow the pool for reads, reopening it first if it was closed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if a reconnect is needed and fails.
    pub async fn pool(&mut self) -> Result<&SqlitePool, DbError> {
        self.ensure_open().await?;
        Ok(&self.pool)
    }

    async fn ensure_open(&mut self) -> Result<(), DbError> {
        if self.pool.is_closed() {
            tracing::warn!("store connection was closed, reopening");
            self.pool = connect_pool(&self.config.database_path, &self.config).await?;
        }
        Ok(())
    }

    /// Close the underlying pool. The next call to [`Store::pool`] or
    /// [`Store::begin_write`] reopens it.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Start a write transaction.
    ///
    /// With [`BackupPoint::BeforeBegin`] the backup is taken here and a
    /// failed backup aborts the write before anything changes.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Backup`] if the pre-write backup fails or
    /// [`DbError::Sqlx`] if the transaction cannot be opened.
    pub async fn begin_write(&mut self, backup_point: BackupPoint) -> Result<WriteTx<'_>, DbError> {
        self.ensure_open().await?;

        let pre_backup = match backup_point {
            BackupPoint::BeforeBegin => Some(backup::write_backup(&self.pool, &self.config).await?),
            BackupPoint::AfterCommit => None,
        };
        let tx = self.pool.begin().await?;

        Ok(WriteTx {
            tx,
            store: self,
            pre_backup,
        })
    }

    /// Take an on-demand backup of the current database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Backup`] if the snapshot cannot be written.
    pub async fn backup(&mut self) -> Result<PathBuf, DbError> {
        self.ensure_open().await?;
        backup::write_backup(&self.pool, &self.config).await
    }

    /// Backups of this database in the configured backup directory, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the directory exists but cannot be read.
    pub async fn list_backups(&self) -> Result<Vec<backup::BackupFile>, DbError> {
        backup::list_backups(&self.config).await
    }

    /// Replace the live database with the contents of `backup_path`.
    ///
    /// 1. Verify the backup exists (nothing is touched otherwise).
    /// 2. Close the pool so no connection holds the file.
    /// 3. Swap the file in and drop stale journal side files.
    /// 4. Reopen and bring the schema up to date, since older backups may
    ///    predate later migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::BackupNotFound`] for a missing backup, or
    /// [`DbError::Io`] / [`DbError::Sqlx`] if the swap or reconnect fails.
    pub async fn restore(&mut self, backup_path: &Path) -> Result<(), DbError> {
        let exists = tokio::fs::try_exists(backup_path)
            .await
            .map_err(|e| DbError::io(backup_path, e))?;
        if !exists {
            return Err(DbError::BackupNotFound(backup_path.display().to_string()));
        }

        self.pool.close().await;
        let swapped = backup::replace_database_file(backup_path, &self.config.database_path).await;

        // Reconnect even when the swap failed so the handle stays usable.
        self.pool = connect_pool(&self.config.database_path, &self.config).await?;
        swapped?;
        run_migrations(&self.pool).await?;

        tracing::info!(
            backup = %backup_path.display(),
            database = %self.config.database_path.display(),
            "database restored from backup"
        );
        Ok(())
    }
}

/// An open write transaction.
///
/// Dropping it without calling [`WriteTx::commit`] rolls back every
/// statement run through [`WriteTx::conn`].
pub struct WriteTx<'s> {
    tx: Transaction<'static, Sqlite>,
    store: &'s Store,
    pre_backup: Option<PathBuf>,
}

impl WriteTx<'_> {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit and return the path of the backup associated with this write.
    ///
    /// For [`BackupPoint::AfterCommit`] the data is already durable when the
    /// backup runs; a backup failure is reported but does not undo the write.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the commit fails, or [`DbError::Backup`]
    /// if the post-commit backup fails.
    pub async fn commit(self) -> Result<PathBuf, DbError> {
        self.tx.commit().await?;
        match self.pre_backup {
            Some(path) => Ok(path),
            None => backup::write_backup(&self.store.pool, &self.store.config).await,
        }
    }
}
