//! Snapshot ingestion and date clearing.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use vtrack_core::Settings;
use vtrack_db::{ClearOutcome, IngestMode, Store};
use vtrack_ingest::{ingest_snapshot, plan_snapshot, read_snapshot_file, IngestError, IngestReport};

enum FileOutcome {
    Ingested(IngestReport),
    Planned {
        report: IngestReport,
        date_has_data: bool,
    },
    /// The date already holds data and neither `--replace` nor `--merge` was
    /// given.
    Refused(NaiveDate),
}

/// Ingest every file in `files`, in order.
///
/// A file that cannot be read or fails validation is reported and skipped;
/// the remaining files are still processed. A store failure stops the batch
/// since later files would fail the same way.
///
/// # Errors
///
/// Returns an error if the store fails, or once the batch is done if any
/// file was skipped or refused.
pub(crate) async fn run_ingest(
    store: &mut Store,
    settings: &Settings,
    files: &[PathBuf],
    mode: Option<IngestMode>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!("dry run: nothing will be written");
    }

    let mut not_ingested = 0usize;
    for path in files {
        match ingest_file(store, settings, path, mode, dry_run).await {
            Ok(FileOutcome::Ingested(report)) => print_report(path, &report),
            Ok(FileOutcome::Planned {
                report,
                date_has_data,
            }) => {
                print_report(path, &report);
                if date_has_data && mode.is_none() {
                    println!(
                        "  note: {} already has data; pass --replace or --merge to ingest it",
                        report.performance_date
                    );
                }
            }
            Ok(FileOutcome::Refused(date)) => {
                not_ingested += 1;
                println!(
                    "{}: {date} already has data; pass --replace to overwrite the day or --merge to update it",
                    path.display()
                );
            }
            Err(e) if e.is_input_error() => {
                not_ingested += 1;
                tracing::warn!(path = %path.display(), error = %e, "snapshot skipped");
                eprintln!("{}: skipped: {e}", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if not_ingested > 0 {
        anyhow::bail!("{not_ingested} of {} snapshot(s) were not ingested", files.len());
    }
    Ok(())
}

async fn ingest_file(
    store: &mut Store,
    settings: &Settings,
    path: &Path,
    mode: Option<IngestMode>,
    dry_run: bool,
) -> Result<FileOutcome, IngestError> {
    let snapshot = read_snapshot_file(path)?;
    let date_has_data = store.has_data_for_date(snapshot.performance_date).await?;

    if dry_run {
        let report = plan_snapshot(store, &snapshot, settings).await?;
        return Ok(FileOutcome::Planned {
            report,
            date_has_data,
        });
    }

    let mode = match mode {
        Some(mode) => mode,
        None if date_has_data => return Ok(FileOutcome::Refused(snapshot.performance_date)),
        None => IngestMode::Merge,
    };

    let report = ingest_snapshot(store, &snapshot, settings, mode).await?;
    Ok(FileOutcome::Ingested(report))
}

fn print_report(path: &Path, report: &IngestReport) {
    println!(
        "{}: {} rows={} admitted={} skipped={} new_videos={} updated_videos={}",
        path.display(),
        report.performance_date,
        report.rows_in,
        report.admitted,
        report.skipped,
        report.videos_inserted,
        report.videos_updated,
    );
    if let Some(backup) = &report.backup_path {
        println!("  backup: {}", backup.display());
    }
}

/// Delete every row stored for `date`.
///
/// # Errors
///
/// Returns an error if the backup or the delete fails.
pub(crate) async fn run_clear(store: &mut Store, date: NaiveDate) -> anyhow::Result<()> {
    match store.clear_date(date).await? {
        ClearOutcome::NoData => println!("no data stored for {date}; nothing cleared"),
        ClearOutcome::Cleared {
            rows_deleted,
            backup_path,
        } => {
            println!("cleared {rows_deleted} row(s) for {date}");
            println!("backup taken before clearing: {}", backup_path.display());
        }
    }
    Ok(())
}
