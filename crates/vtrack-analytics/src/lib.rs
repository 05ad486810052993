//! Time-series aggregation and trending scores for vtrack.
//!
//! `aggregate` and `virality` are pure functions over rows already loaded
//! from the store; `series` and `trending` wire them to a [`vtrack_db::Store`].

pub mod aggregate;
pub mod error;
pub mod series;
pub mod trending;
pub mod virality;

pub use aggregate::{aggregate, period_start, SeriesPoint};
pub use error::AnalyticsError;
pub use series::get_time_series;
pub use trending::{compute_trending, TrendingQuery, TrendingVideo};
pub use virality::{ScoreWeights, ViralityRow, DEFAULT_TRENDING_THRESHOLD, EPSILON};
