use std::collections::HashMap;

use chrono::NaiveDate;
use vtrack_core::CoreError;
use vtrack_db::{list_engagement_samples, list_video_labels, Store, VideoLabelRow};

use crate::error::AnalyticsError;
use crate::virality::{
    classify, compute_growth_metrics, daily_scores, ensure_complete, latest_video_scores,
    score_rows, ScoreWeights, DEFAULT_TRENDING_THRESHOLD,
};

/// Parameters of one trending calculation. Each date bound is optional and
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub threshold: f64,
    pub weights: ScoreWeights,
}

impl Default for TrendingQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            threshold: DEFAULT_TRENDING_THRESHOLD,
            weights: ScoreWeights::default(),
        }
    }
}

/// A trending video: its latest qualifying day, labelled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingVideo {
    pub video_id: String,
    pub creator_name: Option<String>,
    pub video_info: Option<String>,
    pub performance_date: NaiveDate,
    pub trending_score: f64,
    pub total_views: f64,
    pub dgr: f64,
    pub er: f64,
    pub egr: f64,
    pub momentum: f64,
}

fn validate(query: &TrendingQuery) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if start > end {
            return Err(CoreError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
    }
    if !query.threshold.is_finite() {
        return Err(CoreError::Validation(format!(
            "threshold must be a finite number, got {}",
            query.threshold
        )));
    }
    Ok(())
}

/// Score every loaded video-day, persist the scores, and return the
/// trending videos ranked by score.
///
/// 1. Load engagement counters within the date bounds.
/// 2. Derive growth metrics and verify they are all finite.
/// 3. Normalize and score.
/// 4. Persist per-day and latest-per-video scores (backed up first).
/// 5. Keep the latest qualifying day of each video at or above the
///    threshold and label it with the video's creator and description.
///
/// An empty history returns an empty list without writing anything.
///
/// # Errors
///
/// Returns [`AnalyticsError::Core`] for invalid bounds or a non-finite
/// metric (nothing is written), or [`AnalyticsError::Db`] if loading or
/// persisting fails.
pub async fn compute_trending(
    store: &mut Store,
    query: &TrendingQuery,
) -> Result<Vec<TrendingVideo>, AnalyticsError> {
    validate(query)?;

    // Step 1: Load.
    let samples = list_engagement_samples(store.pool().await?, query.start, query.end).await?;
    if samples.is_empty() {
        tracing::info!("no performance history in range, nothing to score");
        return Ok(Vec::new());
    }

    // Step 2 + 3: Derive, check, score.
    let mut rows = compute_growth_metrics(&samples);
    ensure_complete(&rows)?;
    score_rows(&mut rows, &query.weights);

    // Step 4: Persist.
    let outcome = store
        .persist_scores(&latest_video_scores(&rows), &daily_scores(&rows))
        .await?;

    // Step 5: Classify and label.
    let trending = classify(&rows, query.threshold);
    let labels: HashMap<String, VideoLabelRow> = list_video_labels(store.pool().await?)
        .await?
        .into_iter()
        .map(|l| (l.video_id.clone(), l))
        .collect();

    let videos: Vec<TrendingVideo> = trending
        .into_iter()
        .map(|row| {
            let label = labels.get(&row.video_id);
            TrendingVideo {
                creator_name: label.and_then(|l| l.creator_name.clone()),
                video_info: label.and_then(|l| l.video_info.clone()),
                video_id: row.video_id,
                performance_date: row.performance_date,
                trending_score: row.trending_score,
                total_views: row.total_views,
                dgr: row.dgr,
                er: row.er,
                egr: row.egr,
                momentum: row.momentum,
            }
        })
        .collect();

    tracing::info!(
        scored_rows = rows.len(),
        trending = videos.len(),
        threshold = query.threshold,
        backup = %outcome.backup_path.display(),
        "trending scores computed"
    );
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_bounds_are_rejected() {
        let query = TrendingQuery {
            start: NaiveDate::from_ymd_opt(2025, 3, 9),
            end: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..TrendingQuery::default()
        };
        assert!(matches!(validate(&query), Err(CoreError::Validation(_))));
    }

    #[test]
    fn single_bound_is_valid() {
        let query = TrendingQuery {
            end: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..TrendingQuery::default()
        };
        assert!(validate(&query).is_ok());
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let query = TrendingQuery {
            threshold: f64::NAN,
            ..TrendingQuery::default()
        };
        assert!(validate(&query).is_err());
    }
}
