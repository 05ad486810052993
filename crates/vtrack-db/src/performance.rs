//! Queries against the `daily_performance` table.

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use vtrack_core::{DailyMetrics, DailyScore, EngagementSample, PerformanceMetrics, VideoPerformance};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// The metric columns of one stored daily row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyPerformanceRow {
    pub performance_date: NaiveDate,
    pub vv: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub new_followers: i64,
    pub v_to_l_clicks: i64,
    pub product_impressions: i64,
    pub product_clicks: i64,
    pub buyers: i64,
    pub orders: i64,
    pub unit_sales: i64,
    pub video_revenue: f64,
    pub gpm: f64,
    pub shoppable_video_attributed_gmv: f64,
    pub ctr: Option<f64>,
    pub v_to_l_rate: Option<f64>,
    pub video_finish_rate: Option<f64>,
    pub ctor: Option<f64>,
}

impl From<DailyPerformanceRow> for DailyMetrics {
    fn from(row: DailyPerformanceRow) -> Self {
        DailyMetrics {
            performance_date: row.performance_date,
            metrics: PerformanceMetrics {
                vv: row.vv,
                likes: row.likes,
                comments: row.comments,
                shares: row.shares,
                new_followers: row.new_followers,
                v_to_l_clicks: row.v_to_l_clicks,
                product_impressions: row.product_impressions,
                product_clicks: row.product_clicks,
                buyers: row.buyers,
                orders: row.orders,
                unit_sales: row.unit_sales,
                video_revenue: row.video_revenue,
                gpm: row.gpm,
                shoppable_video_attributed_gmv: row.shoppable_video_attributed_gmv,
                ctr: row.ctr,
                v_to_l_rate: row.v_to_l_rate,
                video_finish_rate: row.video_finish_rate,
                ctor: row.ctor,
            },
        }
    }
}

/// One video's numbers on a given day, for the top-performers listing.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TopVideoRow {
    pub video_id: String,
    pub creator_name: Option<String>,
    pub video_info: Option<String>,
    pub vv: i64,
    pub comments: i64,
    pub shares: i64,
    pub video_revenue: f64,
    pub ctr: Option<f64>,
    pub ctor: Option<f64>,
    pub video_finish_rate: Option<f64>,
    pub trending_score: f64,
}

#[derive(sqlx::FromRow)]
struct EngagementSampleRow {
    video_id: String,
    performance_date: NaiveDate,
    vv: i64,
    likes: i64,
    comments: i64,
    shares: i64,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Number of stored rows for `date`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn count_rows_for_date<'e, E>(executor: E, date: NaiveDate) -> Result<i64, DbError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM daily_performance WHERE performance_date = ?",
    )
    .bind(date)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

/// Most recent date with any stored row, or `None` for an empty store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn latest_performance_date(pool: &SqlitePool) -> Result<Option<NaiveDate>, DbError> {
    let latest = sqlx::query_scalar::<_, Option<NaiveDate>>(
        "SELECT MAX(performance_date) FROM daily_performance",
    )
    .fetch_one(pool)
    .await?;
    Ok(latest)
}

/// Full daily history of one video, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_daily_metrics(
    pool: &SqlitePool,
    video_id: &str,
) -> Result<Vec<DailyMetrics>, DbError> {
    let rows = sqlx::query_as::<_, DailyPerformanceRow>(
        "SELECT performance_date, vv, likes, comments, shares, new_followers, \
                v_to_l_clicks, product_impressions, product_clicks, buyers, orders, \
                unit_sales, video_revenue, gpm, shoppable_video_attributed_gmv, \
                ctr, v_to_l_rate, video_finish_rate, ctor \
         FROM daily_performance \
         WHERE video_id = ? \
         ORDER BY performance_date",
    )
    .bind(video_id.trim())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(DailyMetrics::from).collect())
}

/// Engagement counters for every video within the optional inclusive date
/// bounds, grouped by video and ordered by date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_engagement_samples(
    pool: &SqlitePool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<EngagementSample>, DbError> {
    let rows = sqlx::query_as::<_, EngagementSampleRow>(
        "SELECT video_id, performance_date, vv, likes, comments, shares \
         FROM daily_performance \
         WHERE (?1 IS NULL OR performance_date >= ?1) \
           AND (?2 IS NULL OR performance_date <= ?2) \
         ORDER BY video_id, performance_date",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| EngagementSample {
            video_id: r.video_id,
            performance_date: r.performance_date,
            vv: r.vv,
            likes: r.likes,
            comments: r.comments,
            shares: r.shares,
        })
        .collect())
}

/// Every video stored for `date`, most viewed first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn top_videos_for_date(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<TopVideoRow>, DbError> {
    let rows = sqlx::query_as::<_, TopVideoRow>(
        "SELECT dp.video_id, v.creator_name, v.video_info, dp.vv, dp.comments, dp.shares, \
                dp.video_revenue, dp.ctr, dp.ctor, dp.video_finish_rate, dp.trending_score \
         FROM daily_performance dp \
         JOIN videos v ON v.video_id = dp.video_id \
         WHERE dp.performance_date = ? \
         ORDER BY dp.vv DESC, dp.video_id",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes (transaction-scoped)
// ---------------------------------------------------------------------------

pub(crate) async fn delete_rows_for_date(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM daily_performance WHERE performance_date = ?")
        .bind(date)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Write one video's row for `date`, replacing any row already stored for
/// the same `(video_id, performance_date)`. Derived scores reset to zero
/// because they no longer describe the new numbers.
pub(crate) async fn upsert_daily_row(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    row: &VideoPerformance,
) -> Result<(), DbError> {
    let m = &row.metrics;
    sqlx::query(
        "INSERT INTO daily_performance \
             (video_id, performance_date, vv, likes, comments, shares, new_followers, \
              v_to_l_clicks, product_impressions, product_clicks, buyers, orders, \
              unit_sales, video_revenue, gpm, shoppable_video_attributed_gmv, \
              ctr, v_to_l_rate, video_finish_rate, ctor) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (video_id, performance_date) DO UPDATE SET \
             vv = excluded.vv, \
             likes = excluded.likes, \
             comments = excluded.comments, \
             shares = excluded.shares, \
             new_followers = excluded.new_followers, \
             v_to_l_clicks = excluded.v_to_l_clicks, \
             product_impressions = excluded.product_impressions, \
             product_clicks = excluded.product_clicks, \
             buyers = excluded.buyers, \
             orders = excluded.orders, \
             unit_sales = excluded.unit_sales, \
             video_revenue = excluded.video_revenue, \
             gpm = excluded.gpm, \
             shoppable_video_attributed_gmv = excluded.shoppable_video_attributed_gmv, \
             ctr = excluded.ctr, \
             v_to_l_rate = excluded.v_to_l_rate, \
             video_finish_rate = excluded.video_finish_rate, \
             ctor = excluded.ctor, \
             dgr = 0, er = 0, egr = 0, momentum = 0, trending_score = 0",
    )
    .bind(&row.video_id)
    .bind(date)
    .bind(m.vv)
    .bind(m.likes)
    .bind(m.comments)
    .bind(m.shares)
    .bind(m.new_followers)
    .bind(m.v_to_l_clicks)
    .bind(m.product_impressions)
    .bind(m.product_clicks)
    .bind(m.buyers)
    .bind(m.orders)
    .bind(m.unit_sales)
    .bind(m.video_revenue)
    .bind(m.gpm)
    .bind(m.shoppable_video_attributed_gmv)
    .bind(m.ctr)
    .bind(m.v_to_l_rate)
    .bind(m.video_finish_rate)
    .bind(m.ctor)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) async fn update_daily_score(
    conn: &mut SqliteConnection,
    score: &DailyScore,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE daily_performance \
         SET dgr = ?, er = ?, egr = ?, momentum = ?, trending_score = ? \
         WHERE video_id = ? AND performance_date = ?",
    )
    .bind(score.dgr)
    .bind(score.er)
    .bind(score.egr)
    .bind(score.momentum)
    .bind(score.trending_score)
    .bind(&score.video_id)
    .bind(score.performance_date)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
