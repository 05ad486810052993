//! Normalized performance records passed between the ingest, store, and
//! analytics crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Metric;

/// The metric columns of one video on one day.
///
/// Rates are percentages in `[0, 100]`; `None` means the export had no value
/// (the `--` placeholder).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
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

impl PerformanceMetrics {
    /// The stored value of `metric`, widened to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Views => Some(self.vv as f64),
            Metric::Likes => Some(self.likes as f64),
            Metric::Comments => Some(self.comments as f64),
            Metric::Shares => Some(self.shares as f64),
            Metric::NewFollowers => Some(self.new_followers as f64),
            Metric::VToLClicks => Some(self.v_to_l_clicks as f64),
            Metric::ProductImpressions => Some(self.product_impressions as f64),
            Metric::ProductClicks => Some(self.product_clicks as f64),
            Metric::Buyers => Some(self.buyers as f64),
            Metric::Orders => Some(self.orders as f64),
            Metric::UnitSales => Some(self.unit_sales as f64),
            Metric::VideoRevenue => Some(self.video_revenue),
            Metric::Gpm => Some(self.gpm),
            Metric::AttributedGmv => Some(self.shoppable_video_attributed_gmv),
            Metric::Ctr => self.ctr,
            Metric::VToLRate => self.v_to_l_rate,
            Metric::VideoFinishRate => self.video_finish_rate,
            Metric::Ctor => self.ctor,
        }
    }
}

/// One decoded row of a performance export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPerformance {
    /// Trimmed, string-typed video identifier.
    pub video_id: String,
    pub video_info: Option<String>,
    pub publish_time: Option<String>,
    pub creator_name: Option<String>,
    pub products: Option<String>,
    pub metrics: PerformanceMetrics,
}

/// A decoded export: every row belongs to the same single day.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub performance_date: NaiveDate,
    pub rows: Vec<VideoPerformance>,
}

/// A stored daily row of one video, as read back for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetrics {
    pub performance_date: NaiveDate,
    pub metrics: PerformanceMetrics,
}

/// The slice of a daily row that the virality calculator reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementSample {
    pub video_id: String,
    pub performance_date: NaiveDate,
    pub vv: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

/// Per-day derived scores written back to `daily_performance`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyScore {
    pub video_id: String,
    pub performance_date: NaiveDate,
    pub dgr: f64,
    pub er: f64,
    pub egr: f64,
    pub momentum: f64,
    pub trending_score: f64,
}

/// Latest-day scores cached on the `videos` row.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoScore {
    pub video_id: String,
    pub dgr: f64,
    pub egr: f64,
    pub momentum: f64,
    pub trending_score: f64,
}
