//! Transactional upsert of one day's snapshot, and clearing a day.

use std::{collections::HashSet, path::PathBuf};

use chrono::NaiveDate;
use vtrack_core::VideoPerformance;

use crate::{
    performance::{count_rows_for_date, delete_rows_for_date, upsert_daily_row},
    store::{BackupPoint, Store},
    videos::{existing_video_ids, insert_video, update_video_details},
    DbError,
};

/// What to do with rows already stored for the snapshot's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Keep rows for videos absent from the new snapshot; overwrite the rest.
    #[default]
    Merge,
    /// Delete every row for the date before writing the snapshot.
    Replace,
}

impl std::fmt::Display for IngestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestMode::Merge => write!(f, "merge"),
            IngestMode::Replace => write!(f, "replace"),
        }
    }
}

/// Result of a committed snapshot upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub performance_date: NaiveDate,
    pub rows_received: usize,
    pub rows_written: usize,
    /// New videos below the view threshold; neither the video nor its row
    /// was stored.
    pub rows_skipped: usize,
    /// Distinct videos created by this snapshot.
    pub videos_inserted: usize,
    /// Distinct already-tracked videos whose details were refreshed.
    pub videos_updated: usize,
    /// Rows deleted up front in [`IngestMode::Replace`].
    pub rows_replaced: u64,
    pub backup_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing was stored for the date; no backup was taken.
    NoData,
    Cleared { rows_deleted: u64, backup_path: PathBuf },
}

impl Store {
    /// Write `rows` as the performance of `date` in a single transaction.
    ///
    /// Known videos have their descriptive fields refreshed. Unknown videos
    /// are inserted only when their views reach `vv_threshold`; otherwise the
    /// row is skipped entirely. Each admitted row replaces any stored row for
    /// the same video and date, so re-ingesting a file is idempotent.
    ///
    /// Any failure rolls the whole snapshot back. A backup is taken after
    /// the commit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if any statement fails (nothing is
    /// written), or [`DbError::Backup`] if the post-commit backup fails (the
    /// data stays committed).
    pub async fn upsert_snapshot(
        &mut self,
        date: NaiveDate,
        rows: &[VideoPerformance],
        vv_threshold: u32,
        mode: IngestMode,
    ) -> Result<UpsertOutcome, DbError> {
        let mut tx = self.begin_write(BackupPoint::AfterCommit).await?;

        let rows_replaced = match mode {
            IngestMode::Replace => delete_rows_for_date(tx.conn(), date).await?,
            IngestMode::Merge => 0,
        };

        let mut known = existing_video_ids(tx.conn()).await?;
        // Counted per distinct video, not per row.
        let mut inserted: HashSet<&str> = HashSet::new();
        let mut updated: HashSet<&str> = HashSet::new();
        let mut rows_skipped = 0;
        let mut rows_written = 0;

        for row in rows {
            if known.contains(&row.video_id) {
                update_video_details(tx.conn(), row).await?;
                if !inserted.contains(row.video_id.as_str()) {
                    updated.insert(row.video_id.as_str());
                }
            } else if row.metrics.vv >= i64::from(vv_threshold) {
                insert_video(tx.conn(), row).await?;
                known.insert(row.video_id.clone());
                inserted.insert(row.video_id.as_str());
            } else {
                rows_skipped += 1;
                continue;
            }

            upsert_daily_row(tx.conn(), date, row).await?;
            rows_written += 1;
        }

        let backup_path = tx.commit().await?;
        let videos_inserted = inserted.len();
        let videos_updated = updated.len();

        tracing::info!(
            date = %date,
            %mode,
            rows_written,
            rows_skipped,
            videos_inserted,
            videos_updated,
            "snapshot stored"
        );

        Ok(UpsertOutcome {
            performance_date: date,
            rows_received: rows.len(),
            rows_written,
            rows_skipped,
            videos_inserted,
            videos_updated,
            rows_replaced,
            backup_path,
        })
    }

    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] on query failure.
    pub async fn has_data_for_date(&mut self, date: NaiveDate) -> Result<bool, DbError> {
        let count = count_rows_for_date(self.pool().await?, date).await?;
        Ok(count > 0)
    }

    /// Delete every stored row for `date`.
    ///
    /// A date with no rows is a no-op: no transaction and no backup. Otherwise
    /// the store is backed up first so the cleared day can be restored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Backup`] if the pre-delete backup fails (nothing is
    /// deleted) or [`DbError::Sqlx`] on query failure.
    pub async fn clear_date(&mut self, date: NaiveDate) -> Result<ClearOutcome, DbError> {
        if !self.has_data_for_date(date).await? {
            tracing::info!(date = %date, "no rows stored for date, nothing to clear");
            return Ok(ClearOutcome::NoData);
        }

        let mut tx = self.begin_write(BackupPoint::BeforeBegin).await?;
        let rows_deleted = delete_rows_for_date(tx.conn(), date).await?;
        let backup_path = tx.commit().await?;

        tracing::info!(date = %date, rows_deleted, "cleared date");
        Ok(ClearOutcome::Cleared {
            rows_deleted,
            backup_path,
        })
    }
}
