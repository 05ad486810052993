//! Aggregation and trending against a temporary store.

use chrono::NaiveDate;
use tempfile::TempDir;
use vtrack_analytics::{compute_trending, get_time_series, AnalyticsError, TrendingQuery};
use vtrack_core::{CoreError, Metric, PerformanceMetrics, Timeframe, VideoPerformance, WeekStart};
use vtrack_db::{get_video_details, IngestMode, Store, StoreConfig};

async fn open_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let store = Store::open(StoreConfig::new(
        dir.path().join("vtrack.db"),
        dir.path().join("db_backup"),
    ))
    .await
    .unwrap_or_else(|e| panic!("Store::open failed: {e}"));
    (dir, store)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap_or_else(|| panic!("bad test date {d}"))
}

fn video(id: &str, creator: &str, vv: i64, likes: i64, product_clicks: i64) -> VideoPerformance {
    VideoPerformance {
        video_id: id.to_string(),
        video_info: Some(format!("{id} haul")),
        publish_time: Some("2025-02-27 09:30".to_string()),
        creator_name: Some(creator.to_string()),
        products: None,
        metrics: PerformanceMetrics {
            vv,
            likes,
            product_clicks,
            ..PerformanceMetrics::default()
        },
    }
}

async fn seed(store: &mut Store) {
    let days = [
        (1, vec![video("V1", "lumen.home", 5_000, 50, 100), video("V2", "north.kitchen", 9_000, 90, 90)]),
        (2, vec![video("V1", "lumen.home", 6_000, 60, 120), video("V2", "north.kitchen", 8_000, 80, 80)]),
        (3, vec![video("V1", "lumen.home", 30_000, 3_000, 600), video("V2", "north.kitchen", 8_500, 85, 85)]),
    ];
    for (d, rows) in days {
        store
            .upsert_snapshot(day(d), &rows, 4_000, IngestMode::Merge)
            .await
            .unwrap_or_else(|e| panic!("seed day {d} failed: {e}"));
    }
}

#[tokio::test]
async fn trending_ranks_breakout_video_and_persists_scores() {
    let (_dir, mut store) = open_store().await;
    seed(&mut store).await;
    let backups_before = store.list_backups().await.expect("backups").len();

    let trending = compute_trending(
        &mut store,
        &TrendingQuery {
            threshold: 0.5,
            ..TrendingQuery::default()
        },
    )
    .await
    .expect("compute_trending");

    assert_eq!(trending[0].video_id, "V1");
    assert_eq!(trending[0].performance_date, day(3));
    assert_eq!(trending[0].creator_name.as_deref(), Some("lumen.home"));
    assert!(trending[0].trending_score >= 0.5);
    assert!(trending.windows(2).all(|w| w[0].trending_score >= w[1].trending_score));

    assert_eq!(
        store.list_backups().await.expect("backups").len(),
        backups_before + 1
    );
    let details = get_video_details(store.pool().await.expect("pool"), "V1")
        .await
        .expect("details");
    assert!((details.trending_score - trending[0].trending_score).abs() < 1e-9);
    assert!(details.dgr > 0.0);
}

#[tokio::test]
async fn empty_store_yields_no_trending_and_no_backup() {
    let (_dir, mut store) = open_store().await;

    let trending = compute_trending(&mut store, &TrendingQuery::default())
        .await
        .expect("compute_trending");
    assert!(trending.is_empty());
    assert!(store.list_backups().await.expect("backups").is_empty());
}

#[tokio::test]
async fn reversed_bounds_fail_before_any_write() {
    let (_dir, mut store) = open_store().await;
    seed(&mut store).await;
    let backups_before = store.list_backups().await.expect("backups").len();

    let err = compute_trending(
        &mut store,
        &TrendingQuery {
            start: Some(day(3)),
            end: Some(day(1)),
            ..TrendingQuery::default()
        },
    )
    .await
    .expect_err("reversed bounds should fail");
    assert!(matches!(err, AnalyticsError::Core(CoreError::Validation(_))));
    assert_eq!(
        store.list_backups().await.expect("backups").len(),
        backups_before
    );
}

#[tokio::test]
async fn weekly_ctr_is_recomputed_from_stored_components() {
    let (_dir, mut store) = open_store().await;
    seed(&mut store).await;

    // 2025-03-02 is a Sunday: day 1 falls in the previous week.
    let series = get_time_series(
        &mut store,
        "V1",
        Metric::Ctr,
        Timeframe::Weekly,
        WeekStart::Sunday,
    )
    .await
    .expect("series");

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].period, NaiveDate::from_ymd_opt(2025, 2, 23).expect("date"));
    assert!((series[0].value - 2.0).abs() < 1e-9);
    // (120 + 600) / (6000 + 30000) * 100
    assert!((series[1].value - 2.0).abs() < 1e-9);

    let views = get_time_series(
        &mut store,
        "V1",
        Metric::Views,
        Timeframe::Monthly,
        WeekStart::Sunday,
    )
    .await
    .expect("monthly views");
    assert_eq!(views.len(), 1);
    assert!((views[0].value - 41_000.0).abs() < 1e-9);
}
