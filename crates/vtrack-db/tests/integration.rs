//! Offline tests for store configuration and row types.
//! These tests do not open a database.

use chrono::NaiveDate;
use std::path::PathBuf;
use vtrack_core::{AppConfig, DailyMetrics, Environment};
use vtrack_db::{DailyPerformanceRow, IngestMode, StoreConfig, VideoSummaryRow};

#[test]
fn store_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_path: PathBuf::from("/srv/vtrack/vtrack.db"),
        backup_dir: PathBuf::from("/srv/vtrack/db_backup"),
        settings_path: PathBuf::from("/srv/vtrack/settings.json"),
        env: Environment::Test,
        log_level: "debug".to_string(),
        db_acquire_timeout_secs: 9,
        db_busy_timeout_secs: 2,
    };

    let config = StoreConfig::from_app_config(&app_config);
    assert_eq!(config.database_path, PathBuf::from("/srv/vtrack/vtrack.db"));
    assert_eq!(config.backup_dir, PathBuf::from("/srv/vtrack/db_backup"));
    assert_eq!(config.acquire_timeout_secs, 9);
    assert_eq!(config.busy_timeout_secs, 2);
}

#[test]
fn daily_row_converts_into_daily_metrics() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
    let row = DailyPerformanceRow {
        performance_date: date,
        vv: 4_200,
        likes: 310,
        comments: 12,
        shares: 9,
        new_followers: 3,
        v_to_l_clicks: 0,
        product_impressions: 900,
        product_clicks: 84,
        buyers: 5,
        orders: 6,
        unit_sales: 7,
        video_revenue: 119.4,
        gpm: 28.43,
        shoppable_video_attributed_gmv: 119.4,
        ctr: Some(2.0),
        v_to_l_rate: None,
        video_finish_rate: Some(14.2),
        ctor: Some(7.14),
    };

    let daily = DailyMetrics::from(row);
    assert_eq!(daily.performance_date, date);
    assert_eq!(daily.metrics.vv, 4_200);
    assert_eq!(daily.metrics.product_clicks, 84);
    assert_eq!(daily.metrics.v_to_l_rate, None);
    assert_eq!(daily.metrics.video_finish_rate, Some(14.2));
}

/// Compile-time smoke test: confirm that [`VideoSummaryRow`] has all expected
/// fields with the correct types.
#[test]
fn video_summary_row_has_expected_fields() {
    let row = VideoSummaryRow {
        video_id: "7312345678901234567".to_string(),
        video_info: Some("desk lamp unboxing".to_string()),
        publish_time: None,
        creator_name: Some("lumen.home".to_string()),
        products: None,
        total_vv: 12_000,
        total_shares: 40,
        total_video_revenue: 310.25,
    };

    assert_eq!(row.total_vv, 12_000);
    assert!(row.publish_time.is_none());
}

#[test]
fn ingest_mode_defaults_to_merge() {
    assert_eq!(IngestMode::default(), IngestMode::Merge);
    assert_eq!(IngestMode::Replace.to_string(), "replace");
}
