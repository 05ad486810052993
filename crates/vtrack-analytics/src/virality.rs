//! Trending-score pipeline.
//!
//! The stages run in order over the whole (optionally date-bounded) history:
//!
//! 1. [`compute_growth_metrics`]: per-video, per-day growth and engagement.
//! 2. [`ensure_complete`]: reject any non-finite derived value.
//! 3. [`score_rows`]: global min-max normalization and the weighted score.
//! 4. [`classify`]: the latest qualifying row per trending video, ranked.
//!
//! Every stage is pure; persistence lives in [`crate::trending`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use vtrack_core::{CoreError, DailyScore, EngagementSample, VideoScore};

/// Added to every denominator so a zero never divides.
pub const EPSILON: f64 = 1e-6;

pub const DEFAULT_TRENDING_THRESHOLD: f64 = 0.7;

/// Number of trailing days averaged into momentum.
pub const MOMENTUM_WINDOW: usize = 3;

/// Weights of the normalized inputs in the trending score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub total_views: f64,
    pub daily_views: f64,
    pub dgr: f64,
    pub er: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            total_views: 0.3,
            daily_views: 0.2,
            dgr: 0.3,
            er: 0.2,
        }
    }
}

/// One video-day carried through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ViralityRow {
    pub video_id: String,
    pub performance_date: NaiveDate,
    pub daily_views: f64,
    /// Views summed over every loaded day up to and including this one.
    pub total_views: f64,
    pub daily_engagements: f64,
    pub total_engagements: f64,
    /// Daily growth rate of views, in percent.
    pub dgr: f64,
    /// Engagement rate over cumulative totals, in percent.
    pub er: f64,
    /// Growth rate of cumulative engagements, in percent.
    pub egr: f64,
    pub momentum: f64,
    pub trending_score: f64,
}

fn growth(current: f64, previous: f64) -> f64 {
    (current - previous) / (previous + EPSILON) * 100.0
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Derive per-day metrics for every video.
///
/// The first loaded day of a video has no predecessor: its DGR and EGR are
/// 0 and it does not count toward momentum. Output is ordered by video ID,
/// then date.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_growth_metrics(samples: &[EngagementSample]) -> Vec<ViralityRow> {
    let mut sorted: Vec<&EngagementSample> = samples.iter().collect();
    sorted.sort_by(|a, b| {
        a.video_id
            .cmp(&b.video_id)
            .then(a.performance_date.cmp(&b.performance_date))
    });

    let mut rows: Vec<ViralityRow> = Vec::with_capacity(sorted.len());
    // DGRs of the current video, `None` for its first day.
    let mut dgr_history: Vec<Option<f64>> = Vec::new();

    for sample in sorted {
        let daily_views = sample.vv as f64;
        // Widen before adding so three large counters cannot overflow `i64`.
        let daily_engagements =
            sample.likes as f64 + sample.comments as f64 + sample.shares as f64;

        let previous = rows
            .last()
            .filter(|prev| prev.video_id == sample.video_id);
        if previous.is_none() {
            dgr_history.clear();
        }

        let total_views = previous.map_or(0.0, |p| p.total_views) + daily_views;
        let total_engagements =
            previous.map_or(0.0, |p| p.total_engagements) + daily_engagements;

        let raw_dgr = previous.map(|p| growth(daily_views, p.daily_views));
        let raw_egr = previous.map(|p| growth(total_engagements, p.total_engagements));
        dgr_history.push(raw_dgr);

        let window = &dgr_history[dgr_history.len().saturating_sub(MOMENTUM_WINDOW)..];
        let defined: Vec<f64> = window.iter().flatten().copied().collect();
        let momentum = if defined.is_empty() {
            0.0
        } else {
            defined.iter().sum::<f64>() / defined.len() as f64
        };

        rows.push(ViralityRow {
            video_id: sample.video_id.clone(),
            performance_date: sample.performance_date,
            daily_views,
            total_views,
            daily_engagements,
            total_engagements,
            dgr: finite_or_zero(raw_dgr.unwrap_or(0.0)),
            er: finite_or_zero(total_engagements / total_views * 100.0),
            egr: finite_or_zero(raw_egr.unwrap_or(0.0)),
            momentum: finite_or_zero(momentum),
            trending_score: 0.0,
        });
    }

    rows
}

/// # Errors
///
/// Returns [`CoreError::MetricComputation`] naming the first derived metric
/// that is NaN or infinite.
pub fn ensure_complete(rows: &[ViralityRow]) -> Result<(), CoreError> {
    for row in rows {
        for (name, value) in [
            ("total_views", row.total_views),
            ("daily_views", row.daily_views),
            ("dgr", row.dgr),
            ("er", row.er),
            ("egr", row.egr),
            ("momentum", row.momentum),
        ] {
            if !value.is_finite() {
                tracing::error!(
                    video_id = %row.video_id,
                    date = %row.performance_date,
                    metric = name,
                    "derived metric is not finite"
                );
                return Err(CoreError::MetricComputation(name.to_string()));
            }
        }
    }
    Ok(())
}

/// Min-max scale `values` into `[0, 1)` across every row.
fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|v| (v - min) / (max - min + EPSILON))
        .collect()
}

/// Fill in `trending_score` for every row from globally normalized inputs.
pub fn score_rows(rows: &mut [ViralityRow], weights: &ScoreWeights) {
    let column = |f: fn(&ViralityRow) -> f64| normalize(&rows.iter().map(f).collect::<Vec<_>>());
    let total_views = column(|r| r.total_views);
    let daily_views = column(|r| r.daily_views);
    let dgr = column(|r| r.dgr);
    let er = column(|r| r.er);

    for (i, row) in rows.iter_mut().enumerate() {
        row.trending_score = total_views[i] * weights.total_views
            + daily_views[i] * weights.daily_views
            + dgr[i] * weights.dgr
            + er[i] * weights.er;
    }
}

/// Rows scoring at or above `threshold`, keeping only the latest such row
/// per video, ranked by score (ties by video ID).
#[must_use]
pub fn classify(rows: &[ViralityRow], threshold: f64) -> Vec<ViralityRow> {
    let mut latest: HashMap<&str, &ViralityRow> = HashMap::new();
    for row in rows.iter().filter(|r| r.trending_score >= threshold) {
        latest
            .entry(row.video_id.as_str())
            .and_modify(|kept| {
                if kept.performance_date < row.performance_date {
                    *kept = row;
                }
            })
            .or_insert(row);
    }

    let mut ranked: Vec<ViralityRow> = latest.into_values().cloned().collect();
    ranked.sort_by(|a, b| {
        b.trending_score
            .total_cmp(&a.trending_score)
            .then_with(|| a.video_id.cmp(&b.video_id))
    });
    ranked
}

/// Per-day scores for every row.
#[must_use]
pub fn daily_scores(rows: &[ViralityRow]) -> Vec<DailyScore> {
    rows.iter()
        .map(|r| DailyScore {
            video_id: r.video_id.clone(),
            performance_date: r.performance_date,
            dgr: r.dgr,
            er: r.er,
            egr: r.egr,
            momentum: r.momentum,
            trending_score: r.trending_score,
        })
        .collect()
}

/// Scores of each video's most recent loaded day.
#[must_use]
pub fn latest_video_scores(rows: &[ViralityRow]) -> Vec<VideoScore> {
    let mut latest: BTreeMap<&str, &ViralityRow> = BTreeMap::new();
    for row in rows {
        latest
            .entry(row.video_id.as_str())
            .and_modify(|kept| {
                if kept.performance_date < row.performance_date {
                    *kept = row;
                }
            })
            .or_insert(row);
    }

    latest
        .into_values()
        .map(|r| VideoScore {
            video_id: r.video_id.clone(),
            dgr: r.dgr,
            egr: r.egr,
            momentum: r.momentum,
            trending_score: r.trending_score,
        })
        .collect()
}

#[cfg(test)]
#[path = "virality_test.rs"]
mod tests;
