//! Snapshot ingestion orchestration.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use vtrack_core::{CoreError, Settings, Snapshot};
use vtrack_db::{existing_video_ids, IngestMode, Store};

use crate::date_range::parse_date_range;
use crate::error::IngestError;
use crate::filter::filter_admitted;
use crate::normalize::decode_rows;
use crate::types::RawSnapshot;

/// What an ingestion did (or, for a dry run, would do).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub performance_date: NaiveDate,
    pub rows_in: usize,
    pub admitted: usize,
    /// Distinct new videos; a video listed twice counts once.
    pub videos_inserted: usize,
    /// Distinct tracked videos whose details are refreshed.
    pub videos_updated: usize,
    /// Rows left out because their video is new and below the threshold.
    pub skipped: usize,
    /// `None` for a dry run.
    pub backup_path: Option<PathBuf>,
}

/// Read and decode a snapshot document from disk.
///
/// # Errors
///
/// Returns [`IngestError::Io`] or [`IngestError::Json`] if the file cannot
/// be read as a snapshot document, or [`IngestError::Core`] if its date range
/// or rows are invalid.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawSnapshot = serde_json::from_str(&content).map_err(|source| IngestError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_snapshot(&raw)?)
}

/// # Errors
///
/// Returns [`CoreError::Validation`] for a bad date range or cell, or
/// [`CoreError::Schema`] for a missing column.
pub fn parse_snapshot(raw: &RawSnapshot) -> Result<Snapshot, CoreError> {
    let performance_date = parse_date_range(&raw.date_range)?;
    let rows = decode_rows(&raw.rows)?;
    Ok(Snapshot {
        performance_date,
        rows,
    })
}

/// Report what [`ingest_snapshot`] would do without writing anything.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if the existing video IDs cannot be read.
pub async fn plan_snapshot(
    store: &mut Store,
    snapshot: &Snapshot,
    settings: &Settings,
) -> Result<IngestReport, IngestError> {
    let existing = existing_video_ids(store.pool().await?).await?;
    let admitted = filter_admitted(&snapshot.rows, &existing, settings.vv_threshold);

    // Distinct videos: a video listed twice is one insert or one update.
    let mut new_ids = HashSet::new();
    let mut updated_ids = HashSet::new();
    for row in &admitted {
        if existing.contains(&row.video_id) {
            updated_ids.insert(row.video_id.as_str());
        } else {
            new_ids.insert(row.video_id.as_str());
        }
    }

    Ok(IngestReport {
        performance_date: snapshot.performance_date,
        rows_in: snapshot.rows.len(),
        admitted: admitted.len(),
        videos_inserted: new_ids.len(),
        videos_updated: updated_ids.len(),
        skipped: snapshot.rows.len() - admitted.len(),
        backup_path: None,
    })
}

/// Ingest one decoded snapshot.
///
/// 1. Fetch the IDs of videos already tracked.
/// 2. Keep rows whose video is tracked or whose views reach the threshold.
/// 3. Upsert the admitted rows in one transaction (see
///    [`Store::upsert_snapshot`]); the store is backed up after the commit.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if the store fails. Nothing is written in
/// that case.
pub async fn ingest_snapshot(
    store: &mut Store,
    snapshot: &Snapshot,
    settings: &Settings,
    mode: IngestMode,
) -> Result<IngestReport, IngestError> {
    // Step 1: Existing IDs decide admission below the threshold.
    let existing = existing_video_ids(store.pool().await?).await?;

    // Step 2: Pure admission filter.
    let admitted = filter_admitted(&snapshot.rows, &existing, settings.vv_threshold);
    tracing::debug!(
        date = %snapshot.performance_date,
        rows_in = snapshot.rows.len(),
        admitted = admitted.len(),
        threshold = settings.vv_threshold,
        "admission filter applied"
    );

    // Step 3: Transactional write.
    let outcome = store
        .upsert_snapshot(
            snapshot.performance_date,
            &admitted,
            settings.vv_threshold,
            mode,
        )
        .await?;

    Ok(IngestReport {
        performance_date: snapshot.performance_date,
        rows_in: snapshot.rows.len(),
        admitted: outcome.rows_written,
        videos_inserted: outcome.videos_inserted,
        videos_updated: outcome.videos_updated,
        skipped: snapshot.rows.len() - outcome.rows_written,
        backup_path: Some(outcome.backup_path),
    })
}
