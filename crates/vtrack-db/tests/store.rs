//! Store tests against a temporary `SQLite` file.

use chrono::NaiveDate;
use tempfile::TempDir;
use vtrack_core::{DailyScore, PerformanceMetrics, VideoPerformance, VideoScore};
use vtrack_db::{
    count_rows_for_date, get_video_details, latest_performance_date, list_daily_metrics,
    list_engagement_samples, list_videos, search_videos, top_videos_for_date, BackupPoint,
    ClearOutcome, DbError, IngestMode, Store, StoreConfig,
};

const THRESHOLD: u32 = 4000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let config = StoreConfig::new(
        dir.path().join("vtrack.db"),
        dir.path().join("db_backup"),
    );
    let store = Store::open(config)
        .await
        .unwrap_or_else(|e| panic!("Store::open failed: {e}"));
    (dir, store)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap_or_else(|| panic!("bad test date {d}"))
}

fn video(id: &str, vv: i64) -> VideoPerformance {
    VideoPerformance {
        video_id: id.to_string(),
        video_info: Some(format!("{id} unboxing")),
        publish_time: Some("2025-02-20 18:00".to_string()),
        creator_name: Some("lumen.home".to_string()),
        products: Some("Desk Lamp".to_string()),
        metrics: PerformanceMetrics {
            vv,
            likes: vv / 10,
            comments: vv / 100,
            shares: vv / 200,
            product_clicks: vv / 50,
            orders: vv / 500,
            video_revenue: 12.5,
            ctr: Some(2.0),
            ..PerformanceMetrics::default()
        },
    }
}

async fn backup_count(store: &Store) -> usize {
    store
        .list_backups()
        .await
        .unwrap_or_else(|e| panic!("list_backups failed: {e}"))
        .len()
}

// ---------------------------------------------------------------------------
// Section 1: Upsert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_video_below_threshold_is_not_created() {
    let (_dir, mut store) = open_store().await;

    let day1 = store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("day 1 upsert failed");
    assert_eq!(day1.videos_inserted, 1);
    assert_eq!(day1.rows_written, 1);

    let day2 = store
        .upsert_snapshot(
            day(2),
            &[video("V1", 3000), video("V2", 1000)],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect("day 2 upsert failed");
    assert_eq!(day2.videos_updated, 1);
    assert_eq!(day2.videos_inserted, 0);
    assert_eq!(day2.rows_skipped, 1);

    let pool = store.pool().await.expect("pool");
    let v1 = list_daily_metrics(pool, "V1").await.expect("V1 history");
    assert_eq!(v1.len(), 2);
    assert_eq!(v1[1].performance_date, day(2));
    assert_eq!(v1[1].metrics.vv, 3000);

    assert!(list_daily_metrics(pool, "V2").await.expect("V2 history").is_empty());
    assert!(matches!(
        get_video_details(pool, "V2").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn repeated_rows_count_each_video_once() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(day(1), &[video("V2", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("day 1 upsert failed");

    let rows = vec![
        video("V1", 5000),
        video("V1", 6000),
        video("V2", 4500),
        video("V2", 4600),
    ];
    let outcome = store
        .upsert_snapshot(day(2), &rows, THRESHOLD, IngestMode::Merge)
        .await
        .expect("day 2 upsert failed");

    assert_eq!(outcome.rows_written, 4);
    assert_eq!(outcome.videos_inserted, 1);
    assert_eq!(outcome.videos_updated, 1);

    let pool = store.pool().await.expect("pool");
    assert_eq!(count_rows_for_date(pool, day(2)).await.expect("count"), 2);
    let v1 = list_daily_metrics(pool, "V1").await.expect("V1 history");
    assert_eq!(v1[0].metrics.vv, 6000);
}

#[tokio::test]
async fn reingesting_same_snapshot_is_idempotent() {
    let (_dir, mut store) = open_store().await;
    let rows = vec![video("V1", 5000), video("V2", 8000)];

    store
        .upsert_snapshot(day(1), &rows, THRESHOLD, IngestMode::Merge)
        .await
        .expect("first upsert failed");
    let before = list_videos(store.pool().await.expect("pool"))
        .await
        .expect("list before");

    let second = store
        .upsert_snapshot(day(1), &rows, THRESHOLD, IngestMode::Merge)
        .await
        .expect("second upsert failed");
    assert_eq!(second.videos_inserted, 0);
    assert_eq!(second.videos_updated, 2);

    let pool = store.pool().await.expect("pool");
    let after = list_videos(pool).await.expect("list after");
    assert_eq!(before, after);
    assert_eq!(count_rows_for_date(pool, day(1)).await.expect("count"), 2);
}

#[tokio::test]
async fn replace_mode_drops_rows_missing_from_new_snapshot() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(
            day(1),
            &[video("V1", 5000), video("V2", 6000)],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect("seed upsert failed");

    let merged = store
        .upsert_snapshot(day(1), &[video("V1", 5500)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("merge upsert failed");
    assert_eq!(merged.rows_replaced, 0);
    assert_eq!(
        count_rows_for_date(store.pool().await.expect("pool"), day(1))
            .await
            .expect("count"),
        2
    );

    let replaced = store
        .upsert_snapshot(day(1), &[video("V1", 5500)], THRESHOLD, IngestMode::Replace)
        .await
        .expect("replace upsert failed");
    assert_eq!(replaced.rows_replaced, 2);
    assert_eq!(
        count_rows_for_date(store.pool().await.expect("pool"), day(1))
            .await
            .expect("count"),
        1
    );
}

#[tokio::test]
async fn known_video_details_are_refreshed() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("seed upsert failed");

    let mut renamed = video("V1", 10);
    renamed.creator_name = Some("lumen.studio".to_string());
    store
        .upsert_snapshot(day(2), &[renamed], THRESHOLD, IngestMode::Merge)
        .await
        .expect("second upsert failed");

    let details = get_video_details(store.pool().await.expect("pool"), "V1")
        .await
        .expect("details");
    assert_eq!(details.creator_name.as_deref(), Some("lumen.studio"));
    assert_eq!(details.total_vv, 5010);
    assert_eq!(details.days_tracked, 2);
    assert_eq!(details.latest_performance_date, Some(day(2)));
}

#[tokio::test]
async fn failed_row_rolls_back_whole_snapshot() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("seed upsert failed");
    let backups_before = backup_count(&store).await;

    sqlx::query(
        "CREATE TRIGGER reject_bad_row BEFORE INSERT ON daily_performance \
         WHEN NEW.video_id = 'BAD' \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(store.pool().await.expect("pool"))
    .await
    .expect("create trigger");

    let err = store
        .upsert_snapshot(
            day(2),
            &[video("V1", 6000), video("V3", 9000), video("BAD", 9000)],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect_err("upsert with a rejected row should fail");
    assert!(err.is_persistence_failure());

    let pool = store.pool().await.expect("pool");
    assert_eq!(count_rows_for_date(pool, day(2)).await.expect("count"), 0);
    assert!(matches!(
        get_video_details(pool, "V3").await,
        Err(DbError::NotFound)
    ));
    assert_eq!(backup_count(&store).await, backups_before);
}

#[tokio::test]
async fn dropped_write_transaction_rolls_back() {
    let (_dir, mut store) = open_store().await;
    {
        let mut tx = store
            .begin_write(BackupPoint::AfterCommit)
            .await
            .expect("begin_write");
        sqlx::query("INSERT INTO videos (video_id) VALUES ('GHOST')")
            .execute(tx.conn())
            .await
            .expect("insert");
    }

    assert!(matches!(
        get_video_details(store.pool().await.expect("pool"), "GHOST").await,
        Err(DbError::NotFound)
    ));
    assert_eq!(backup_count(&store).await, 0);
}

// ---------------------------------------------------------------------------
// Section 2: Clear, backup, restore
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clearing_empty_date_takes_no_backup() {
    let (_dir, mut store) = open_store().await;

    let outcome = store.clear_date(day(1)).await.expect("clear_date");
    assert_eq!(outcome, ClearOutcome::NoData);
    assert_eq!(backup_count(&store).await, 0);
}

#[tokio::test]
async fn clearing_date_backs_up_prior_state_first() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(
            day(1),
            &[video("V1", 5000), video("V2", 7000)],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect("seed upsert failed");

    let ClearOutcome::Cleared {
        rows_deleted,
        backup_path,
    } = store.clear_date(day(1)).await.expect("clear_date")
    else {
        panic!("expected rows to be cleared");
    };
    assert_eq!(rows_deleted, 2);
    assert!(backup_path.exists());
    assert!(!store.has_data_for_date(day(1)).await.expect("has_data"));

    store.restore(&backup_path).await.expect("restore");
    assert!(store.has_data_for_date(day(1)).await.expect("has_data"));
}

#[tokio::test]
async fn restore_brings_back_earlier_row_set() {
    let (_dir, mut store) = open_store().await;
    let first = store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("day 1 upsert failed");
    store
        .upsert_snapshot(day(2), &[video("V1", 6000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("day 2 upsert failed");
    assert_eq!(backup_count(&store).await, 2);

    store.restore(&first.backup_path).await.expect("restore");

    let pool = store.pool().await.expect("pool");
    let history = list_daily_metrics(pool, "V1").await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].performance_date, day(1));
    assert_eq!(latest_performance_date(pool).await.expect("latest"), Some(day(1)));
}

#[tokio::test]
async fn restore_from_missing_file_leaves_store_untouched() {
    let (dir, mut store) = open_store().await;
    store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("seed upsert failed");

    let err = store
        .restore(&dir.path().join("db_backup").join("nope.db"))
        .await
        .expect_err("restore of a missing file should fail");
    assert!(matches!(err, DbError::BackupNotFound(_)));
    assert!(store.has_data_for_date(day(1)).await.expect("has_data"));
}

#[tokio::test]
async fn store_reopens_after_close() {
    let (_dir, mut store) = open_store().await;
    store.close().await;

    let pool = store.pool().await.expect("pool should reopen");
    vtrack_db::ping(pool).await.expect("ping after reopen");
}

// ---------------------------------------------------------------------------
// Section 3: Reads and scores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_matches_creator_and_orders_by_total_views() {
    let (_dir, mut store) = open_store().await;
    let mut other = video("V9", 9000);
    other.creator_name = Some("north.kitchen".to_string());
    other.video_info = Some("pan review".to_string());
    other.products = None;
    store
        .upsert_snapshot(
            day(1),
            &[video("V1", 5000), video("V2", 7000), other],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect("seed upsert failed");

    let pool = store.pool().await.expect("pool");
    let hits = search_videos(pool, "LUMEN").await.expect("search");
    let ids: Vec<&str> = hits.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["V2", "V1"]);

    let all = list_videos(pool).await.expect("list");
    assert_eq!(all.len(), 3);
    assert!((all[0].total_video_revenue - 12.5).abs() < 1e-9);
}

#[tokio::test]
async fn top_videos_are_ranked_by_views_for_the_day() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(
            day(1),
            &[video("V1", 5000), video("V2", 7000), video("V3", 6000)],
            THRESHOLD,
            IngestMode::Merge,
        )
        .await
        .expect("seed upsert failed");

    let top = top_videos_for_date(store.pool().await.expect("pool"), day(1))
        .await
        .expect("top videos");
    let ids: Vec<&str> = top.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["V2", "V3", "V1"]);
    assert_eq!(top[0].ctr, Some(2.0));
}

#[tokio::test]
async fn engagement_samples_apply_each_bound_independently() {
    let (_dir, mut store) = open_store().await;
    for d in 1..=4 {
        store
            .upsert_snapshot(day(d), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
            .await
            .expect("seed upsert failed");
    }
    let pool = store.pool().await.expect("pool");

    let all = list_engagement_samples(pool, None, None).await.expect("all");
    assert_eq!(all.len(), 4);

    let from = list_engagement_samples(pool, Some(day(3)), None)
        .await
        .expect("from");
    assert_eq!(from.len(), 2);
    assert_eq!(from[0].performance_date, day(3));

    let until = list_engagement_samples(pool, None, Some(day(2)))
        .await
        .expect("until");
    assert_eq!(until.len(), 2);
    assert_eq!(until[1].performance_date, day(2));
}

#[tokio::test]
async fn persisting_scores_backs_up_then_updates() {
    let (_dir, mut store) = open_store().await;
    store
        .upsert_snapshot(day(1), &[video("V1", 5000)], THRESHOLD, IngestMode::Merge)
        .await
        .expect("seed upsert failed");
    let backups_before = backup_count(&store).await;

    let outcome = store
        .persist_scores(
            &[VideoScore {
                video_id: "V1".to_string(),
                dgr: 0.0,
                egr: 0.0,
                momentum: 0.0,
                trending_score: 0.81,
            }],
            &[DailyScore {
                video_id: "V1".to_string(),
                performance_date: day(1),
                dgr: 0.0,
                er: 11.5,
                egr: 0.0,
                momentum: 0.0,
                trending_score: 0.81,
            }],
        )
        .await
        .expect("persist_scores");
    assert_eq!(outcome.daily_rows_updated, 1);
    assert_eq!(outcome.videos_updated, 1);
    assert_eq!(backup_count(&store).await, backups_before + 1);

    let details = get_video_details(store.pool().await.expect("pool"), "V1")
        .await
        .expect("details");
    assert!((details.trending_score - 0.81).abs() < 1e-9);
}
