use vtrack_core::{Metric, Timeframe, WeekStart};
use vtrack_db::{list_daily_metrics, Store};

use crate::aggregate::{aggregate, SeriesPoint};
use crate::error::AnalyticsError;

/// Chart one metric of one video, bucketed by `timeframe`.
///
/// A video with no stored rows yields an empty series.
///
/// # Errors
///
/// Returns [`AnalyticsError::Db`] if the video's history cannot be read.
pub async fn get_time_series(
    store: &mut Store,
    video_id: &str,
    metric: Metric,
    timeframe: Timeframe,
    week_start: WeekStart,
) -> Result<Vec<SeriesPoint>, AnalyticsError> {
    let history = list_daily_metrics(store.pool().await?, video_id).await?;
    let series = aggregate(&history, metric, timeframe, week_start);
    tracing::debug!(
        video_id,
        %metric,
        %timeframe,
        days = history.len(),
        periods = series.len(),
        "time series aggregated"
    );
    Ok(series)
}
