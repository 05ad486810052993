//! Queries against the `videos` table.

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use vtrack_core::{VideoPerformance, VideoScore};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A video with lifetime totals across all of its daily rows.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VideoSummaryRow {
    pub video_id: String,
    pub video_info: Option<String>,
    pub publish_time: Option<String>,
    pub creator_name: Option<String>,
    pub products: Option<String>,
    pub total_vv: i64,
    pub total_shares: i64,
    pub total_video_revenue: f64,
}

/// Detail view of one video: totals, latest day, and cached scores.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VideoDetailsRow {
    pub video_id: String,
    pub video_info: Option<String>,
    pub publish_time: Option<String>,
    pub creator_name: Option<String>,
    pub products: Option<String>,
    pub total_vv: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_new_followers: i64,
    pub total_orders: i64,
    pub total_video_revenue: f64,
    pub days_tracked: i64,
    pub latest_performance_date: Option<NaiveDate>,
    pub dgr: f64,
    pub egr: f64,
    pub momentum: f64,
    pub trending_score: f64,
}

const SUMMARY_SELECT: &str = "SELECT v.video_id, v.video_info, v.publish_time, v.creator_name, \
            v.products, \
            COALESCE(SUM(dp.vv), 0) AS total_vv, \
            COALESCE(SUM(dp.shares), 0) AS total_shares, \
            CAST(COALESCE(ROUND(SUM(dp.video_revenue), 2), 0.0) AS REAL) AS total_video_revenue \
     FROM videos v \
     LEFT JOIN daily_performance dp ON dp.video_id = v.video_id";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Trimmed IDs of every stored video.
///
/// Generic over the executor so ingestion can read inside its own
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn existing_video_ids<'e, E>(executor: E) -> Result<HashSet<String>, DbError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let ids = sqlx::query_scalar::<_, String>("SELECT video_id FROM videos")
        .fetch_all(executor)
        .await?;
    Ok(ids.into_iter().map(|id| id.trim().to_string()).collect())
}

/// Every video with lifetime totals, most recently published first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_videos(pool: &SqlitePool) -> Result<Vec<VideoSummaryRow>, DbError> {
    let sql = format!("{SUMMARY_SELECT} GROUP BY v.video_id ORDER BY v.publish_time DESC, v.video_id");
    let rows = sqlx::query_as::<_, VideoSummaryRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Case-insensitive substring search over description, ID, creator, and
/// products. Highest total views first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn search_videos(
    pool: &SqlitePool,
    query: &str,
) -> Result<Vec<VideoSummaryRow>, DbError> {
    let pattern = format!("%{}%", query.trim());
    let sql = format!(
        "{SUMMARY_SELECT} \
         WHERE v.video_info LIKE ?1 OR v.video_id LIKE ?1 \
            OR v.creator_name LIKE ?1 OR v.products LIKE ?1 \
         GROUP BY v.video_id \
         ORDER BY total_vv DESC, v.video_id"
    );
    let rows = sqlx::query_as::<_, VideoSummaryRow>(&sql)
        .bind(pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no video has this ID, or
/// [`DbError::Sqlx`] on query failure.
pub async fn get_video_details(
    pool: &SqlitePool,
    video_id: &str,
) -> Result<VideoDetailsRow, DbError> {
    sqlx::query_as::<_, VideoDetailsRow>(
        "SELECT v.video_id, v.video_info, v.publish_time, v.creator_name, v.products, \
                COALESCE(SUM(dp.vv), 0) AS total_vv, \
                COALESCE(SUM(dp.likes), 0) AS total_likes, \
                COALESCE(SUM(dp.comments), 0) AS total_comments, \
                COALESCE(SUM(dp.shares), 0) AS total_shares, \
                COALESCE(SUM(dp.new_followers), 0) AS total_new_followers, \
                COALESCE(SUM(dp.orders), 0) AS total_orders, \
                CAST(COALESCE(ROUND(SUM(dp.video_revenue), 2), 0.0) AS REAL) AS total_video_revenue, \
                COUNT(dp.performance_date) AS days_tracked, \
                MAX(dp.performance_date) AS latest_performance_date, \
                v.dgr, v.egr, v.momentum, v.trending_score \
         FROM videos v \
         LEFT JOIN daily_performance dp ON dp.video_id = v.video_id \
         WHERE v.video_id = ? \
         GROUP BY v.video_id",
    )
    .bind(video_id.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Creator and description of one video, used to label score listings.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VideoLabelRow {
    pub video_id: String,
    pub creator_name: Option<String>,
    pub video_info: Option<String>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_video_labels(pool: &SqlitePool) -> Result<Vec<VideoLabelRow>, DbError> {
    let rows = sqlx::query_as::<_, VideoLabelRow>(
        "SELECT video_id, creator_name, video_info FROM videos",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes (transaction-scoped)
// ---------------------------------------------------------------------------

pub(crate) async fn insert_video(
    conn: &mut SqliteConnection,
    row: &VideoPerformance,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO videos (video_id, video_info, publish_time, creator_name, products) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&row.video_id)
    .bind(&row.video_info)
    .bind(&row.publish_time)
    .bind(&row.creator_name)
    .bind(&row.products)
    .execute(conn)
    .await?;
    Ok(())
}

/// Refresh the descriptive fields of a known video with the latest export.
pub(crate) async fn update_video_details(
    conn: &mut SqliteConnection,
    row: &VideoPerformance,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE videos \
         SET video_info = ?, publish_time = ?, creator_name = ?, products = ? \
         WHERE video_id = ?",
    )
    .bind(&row.video_info)
    .bind(&row.publish_time)
    .bind(&row.creator_name)
    .bind(&row.products)
    .bind(&row.video_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn update_video_scores(
    conn: &mut SqliteConnection,
    score: &VideoScore,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE videos SET dgr = ?, egr = ?, momentum = ?, trending_score = ? \
         WHERE video_id = ?",
    )
    .bind(score.dgr)
    .bind(score.egr)
    .bind(score.momentum)
    .bind(score.trending_score)
    .bind(&score.video_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
