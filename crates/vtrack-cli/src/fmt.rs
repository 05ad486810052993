//! Display helpers shared by the table-printing handlers.

use chrono::NaiveDate;

const DASH: &str = "\u{2014}";

/// Format an optional date for display, returning a dash when `None`.
pub(crate) fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| DASH.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn fmt_text(value: Option<&str>, max_chars: usize) -> String {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => DASH.to_string(),
        Some(s) if s.chars().count() > max_chars => {
            format!("{}...", s.chars().take(max_chars).collect::<String>())
        }
        Some(s) => s.to_string(),
    }
}

/// A stored percentage with two decimals, or a dash when missing.
pub(crate) fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| DASH.to_string(), |v| format!("{v:.2}%"))
}

/// An aggregated value; NaN means the period had nothing to compute from.
pub(crate) fn fmt_value(value: f64, percentage: bool) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else if percentage {
        format!("{value:.2}%")
    } else if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
