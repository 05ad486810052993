use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use vtrack_core::CoreError;

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[Date Range\]:\s*(\d{4}-\d{2}-\d{2})\s*~\s*(\d{4}-\d{2}-\d{2})")
        .expect("valid date range regex")
});

/// Extract the single performance date from an export header such as
/// `[Date Range]: 2025-03-04 ~ 2025-03-04`.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if the header does not match, names an
/// impossible calendar date, or spans more than one day.
pub fn parse_date_range(text: &str) -> Result<NaiveDate, CoreError> {
    let caps = DATE_RANGE_RE.captures(text).ok_or_else(|| {
        CoreError::Validation(format!("could not find a date range in '{}'", text.trim()))
    })?;

    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| CoreError::Validation(format!("invalid date '{raw}': {e}")))
    };
    let start = parse(&caps[1])?;
    let end = parse(&caps[2])?;

    if start != end {
        return Err(CoreError::Validation(format!(
            "date range {start} ~ {end} spans more than one day"
        )));
    }
    Ok(start)
}
