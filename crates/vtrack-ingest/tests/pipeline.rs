//! End-to-end ingestion against a temporary store.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;
use vtrack_core::{CoreError, Settings};
use vtrack_db::{count_rows_for_date, list_daily_metrics, IngestMode, Store, StoreConfig};
use vtrack_ingest::{ingest_snapshot, plan_snapshot, read_snapshot_file, IngestError};

async fn open_store(dir: &TempDir) -> Store {
    Store::open(StoreConfig::new(
        dir.path().join("vtrack.db"),
        dir.path().join("db_backup"),
    ))
    .await
    .unwrap_or_else(|e| panic!("Store::open failed: {e}"))
}

fn export_row(id: &str, vv: &str) -> Value {
    json!({
        "Video ID": id,
        "Video Info": format!("{id} review"),
        "Time": "2025-02-20 18:00",
        "Creator name": "lumen.home",
        "Products": "Desk Lamp",
        "VV": vv,
        "Likes": 120,
        "Comments": 8,
        "Shares": "3",
        "New followers": 1,
        "V-to-L clicks": "--",
        "Product Impressions": 400,
        "Product Clicks": 40,
        "Buyers": 2,
        "Orders": 2,
        "Unit Sales": 2,
        "Video Revenue ($)": "39.80",
        "GPM ($)": 7.96,
        "Shoppable video attributed GMV ($)": "39.80",
        "CTR": "0.8%",
        "V-to-L rate": "--",
        "Video Finish Rate": "12.1%",
        "CTOR": "5%"
    })
}

fn write_snapshot(dir: &Path, name: &str, date: &str, rows: Vec<Value>) -> PathBuf {
    let path = dir.join(name);
    let doc = json!({
        "date_range": format!("[Date Range]: {date} ~ {date}"),
        "rows": rows,
    });
    std::fs::write(&path, doc.to_string()).unwrap_or_else(|e| panic!("write failed: {e}"));
    path
}

#[tokio::test]
async fn two_day_scenario_applies_threshold_only_to_new_videos() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = open_store(&dir).await;
    let settings = Settings::default();

    let day1_path = write_snapshot(dir.path(), "day1.json", "2025-03-01", vec![export_row("V1", "5,000")]);
    let day1 = read_snapshot_file(&day1_path).expect("read day 1");
    let report = ingest_snapshot(&mut store, &day1, &settings, IngestMode::Merge)
        .await
        .expect("ingest day 1");
    assert_eq!(report.admitted, 1);
    assert_eq!(report.videos_inserted, 1);
    assert!(report.backup_path.as_deref().is_some_and(Path::exists));

    let day2_path = write_snapshot(
        dir.path(),
        "day2.json",
        "2025-03-02",
        vec![export_row("V1", "3000"), export_row("V2", "1000")],
    );
    let day2 = read_snapshot_file(&day2_path).expect("read day 2");
    let report = ingest_snapshot(&mut store, &day2, &settings, IngestMode::Merge)
        .await
        .expect("ingest day 2");
    assert_eq!(report.rows_in, 2);
    assert_eq!(report.admitted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.videos_updated, 1);

    let pool = store.pool().await.expect("pool");
    assert_eq!(list_daily_metrics(pool, "V1").await.expect("V1").len(), 2);
    assert!(list_daily_metrics(pool, "V2").await.expect("V2").is_empty());
}

#[tokio::test]
async fn dry_run_reports_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = open_store(&dir).await;

    let path = write_snapshot(
        dir.path(),
        "day1.json",
        "2025-03-01",
        vec![export_row("V1", "5000"), export_row("V2", "10")],
    );
    let snapshot = read_snapshot_file(&path).expect("read");
    let report = plan_snapshot(&mut store, &snapshot, &Settings::default())
        .await
        .expect("plan");

    assert_eq!(report.admitted, 1);
    assert_eq!(report.videos_inserted, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.backup_path.is_none());

    let date = NaiveDate::from_ymd_opt(2025, 3, 1).expect("date");
    let pool = store.pool().await.expect("pool");
    assert_eq!(count_rows_for_date(pool, date).await.expect("count"), 0);
    assert!(store.list_backups().await.expect("backups").is_empty());
}

#[tokio::test]
async fn dry_run_counts_match_ingest_for_repeated_video() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = open_store(&dir).await;

    let path = write_snapshot(
        dir.path(),
        "day1.json",
        "2025-03-01",
        vec![export_row("V1", "5000"), export_row("V1", "5200")],
    );
    let snapshot = read_snapshot_file(&path).expect("read");
    let settings = Settings::default();

    let planned = plan_snapshot(&mut store, &snapshot, &settings)
        .await
        .expect("plan");
    assert_eq!(planned.admitted, 2);
    assert_eq!(planned.videos_inserted, 1);
    assert_eq!(planned.videos_updated, 0);

    let ingested = ingest_snapshot(&mut store, &snapshot, &settings, IngestMode::Merge)
        .await
        .expect("ingest");
    assert_eq!(ingested.videos_inserted, planned.videos_inserted);
    assert_eq!(ingested.videos_updated, planned.videos_updated);
}

#[test]
fn multi_day_export_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("week.json");
    let doc = json!({
        "date_range": "[Date Range]: 2025-03-01 ~ 2025-03-07",
        "rows": [export_row("V1", "5000")],
    });
    std::fs::write(&path, doc.to_string()).expect("write");

    let err = read_snapshot_file(&path).expect_err("multi-day export should fail");
    assert!(matches!(err, IngestError::Core(CoreError::Validation(_))));
    assert!(err.is_input_error());
}

#[test]
fn export_without_vv_column_is_schema_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut row = export_row("V1", "5000");
    if let Value::Object(map) = &mut row {
        map.remove("VV");
    }
    let path = write_snapshot(dir.path(), "bad.json", "2025-03-01", vec![row]);

    let err = read_snapshot_file(&path).expect_err("missing VV should fail");
    assert!(matches!(
        err,
        IngestError::Core(CoreError::Schema { ref column }) if column == "VV"
    ));
}

#[test]
fn non_json_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.json");
    std::fs::write(&path, "Video ID,VV\n1,2\n").expect("write");

    let err = read_snapshot_file(&path).expect_err("csv text is not a snapshot");
    match err {
        IngestError::Json { path: reported, .. } => assert!(reported.ends_with("notes.json")),
        other => panic!("expected Json error, got {other:?}"),
    }
}
