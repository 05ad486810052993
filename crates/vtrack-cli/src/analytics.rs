//! Time-series and trending handlers.

use chrono::NaiveDate;
use vtrack_analytics::{compute_trending, get_time_series, TrendingQuery};
use vtrack_core::{Metric, Timeframe, WeekStart};
use vtrack_db::Store;

use crate::fmt::{fmt_text, fmt_value};

/// Print one metric of one video per period, oldest first.
///
/// # Errors
///
/// Returns an error if `metric_name` is not a known metric (before the
/// store is queried) or if the query fails.
pub(crate) async fn run_series(
    store: &mut Store,
    video_id: &str,
    metric_name: &str,
    timeframe: Timeframe,
    week_start: WeekStart,
) -> anyhow::Result<()> {
    let metric: Metric = metric_name.parse()?;
    let series = get_time_series(store, video_id, metric, timeframe, week_start).await?;

    if series.is_empty() {
        println!("no performance data found for video '{video_id}'");
        return Ok(());
    }

    if timeframe == Timeframe::Weekly {
        println!("{metric} for {video_id}, weekly (weeks start {week_start})");
    } else {
        println!("{metric} for {video_id}, {timeframe}");
    }
    println!("{:<14}{:>16}", "PERIOD", "VALUE");
    for point in &series {
        println!(
            "{:<14}{:>16}",
            point.period.format("%Y-%m-%d").to_string(),
            fmt_value(point.value, metric.is_percentage())
        );
    }
    Ok(())
}

/// Score the stored history and print the trending videos.
///
/// # Errors
///
/// Returns an error for reversed bounds, a non-finite metric, or a store
/// failure while loading or persisting scores.
pub(crate) async fn run_trending(
    store: &mut Store,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    threshold: f64,
) -> anyhow::Result<()> {
    let query = TrendingQuery {
        start,
        end,
        threshold,
        ..TrendingQuery::default()
    };
    let videos = compute_trending(store, &query).await?;

    if videos.is_empty() {
        println!("no videos scored at or above {threshold}");
        return Ok(());
    }

    println!(
        "{:<5}{:<22}{:<20}{:<12}{:>8}{:>12}{:>11}{:>9}{:>11}{:>11}",
        "RANK", "VIDEO", "CREATOR", "DAY", "SCORE", "VIEWS", "DGR", "ER", "EGR", "MOMENTUM"
    );
    for (rank, video) in videos.iter().enumerate() {
        println!(
            "{:<5}{:<22}{:<20}{:<12}{:>8.3}{:>12.0}{:>10.1}%{:>8.2}%{:>10.1}%{:>10.1}%",
            rank + 1,
            video.video_id,
            fmt_text(video.creator_name.as_deref(), 17),
            video.performance_date.format("%Y-%m-%d").to_string(),
            video.trending_score,
            video.total_views,
            video.dgr,
            video.er,
            video.egr,
            video.momentum,
        );
    }
    Ok(())
}
