use std::path::PathBuf;

use vtrack_core::{DailyScore, VideoScore};

use crate::{
    performance::update_daily_score,
    store::{BackupPoint, Store},
    videos::update_video_scores,
    DbError,
};

/// How many stored rows a score write touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWriteOutcome {
    pub daily_rows_updated: u64,
    pub videos_updated: u64,
    pub backup_path: PathBuf,
}

impl Store {
    /// Overwrite the derived score columns for every given day and video in
    /// one transaction. The store is backed up before the overwrite.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Backup`] if the pre-write backup fails or
    /// [`DbError::Sqlx`] if any update fails (nothing is written).
    pub async fn persist_scores(
        &mut self,
        videos: &[VideoScore],
        daily: &[DailyScore],
    ) -> Result<ScoreWriteOutcome, DbError> {
        let mut tx = self.begin_write(BackupPoint::BeforeBegin).await?;

        let mut daily_rows_updated = 0;
        for score in daily {
            daily_rows_updated += update_daily_score(tx.conn(), score).await?;
        }
        let mut videos_updated = 0;
        for score in videos {
            videos_updated += update_video_scores(tx.conn(), score).await?;
        }

        let backup_path = tx.commit().await?;
        tracing::info!(daily_rows_updated, videos_updated, "scores persisted");

        Ok(ScoreWriteOutcome {
            daily_rows_updated,
            videos_updated,
            backup_path,
        })
    }
}
