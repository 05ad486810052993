//! Re-bucketing of one video's daily rows into daily, weekly, or monthly
//! periods.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use vtrack_core::{Aggregation, DailyMetrics, Metric, PerformanceMetrics, Timeframe, WeekStart};

/// One charted value. `value` is NaN when the period has nothing to divide
/// by or no non-null samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub period: NaiveDate,
    pub value: f64,
}

/// First day of the period that `date` falls into.
///
/// Weekly periods start on the most recent `week_start` weekday at or before
/// `date`.
#[must_use]
pub fn period_start(date: NaiveDate, timeframe: Timeframe, week_start: WeekStart) -> NaiveDate {
    match timeframe {
        Timeframe::Daily => date,
        Timeframe::Weekly => {
            let offset = (date.weekday().num_days_from_monday() + 7
                - week_start.weekday().num_days_from_monday())
                % 7;
            date - Days::new(u64::from(offset))
        }
        Timeframe::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Collapse `rows` into one value per period, oldest period first.
#[must_use]
pub fn aggregate(
    rows: &[DailyMetrics],
    metric: Metric,
    timeframe: Timeframe,
    week_start: WeekStart,
) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&PerformanceMetrics>> = BTreeMap::new();
    for row in rows {
        buckets
            .entry(period_start(row.performance_date, timeframe, week_start))
            .or_default()
            .push(&row.metrics);
    }

    buckets
        .into_iter()
        .map(|(period, group)| SeriesPoint {
            period,
            value: reduce(&group, metric),
        })
        .collect()
}

fn reduce(group: &[&PerformanceMetrics], metric: Metric) -> f64 {
    match metric.aggregation() {
        Aggregation::Sum => sum(group, metric),
        // Recomputed from the raw components so large days weigh more than
        // small ones.
        Aggregation::Ratio {
            numerator,
            denominator,
        } => {
            let den = sum(group, denominator);
            if den == 0.0 {
                f64::NAN
            } else {
                sum(group, numerator) / den * 100.0
            }
        }
        Aggregation::Mean => mean(group.iter().filter_map(|m| m.value(metric))),
    }
}

fn sum(group: &[&PerformanceMetrics], metric: Metric) -> f64 {
    group.iter().filter_map(|m| m.value(metric)).sum()
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (total, n) = values.fold((0.0, 0usize), |(total, n), v| (total + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        total / n as f64
    }
}
