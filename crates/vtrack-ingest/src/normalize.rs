//! Cell decoding for snapshot rows.
//!
//! Cells may be JSON numbers or the strings a spreadsheet export produces:
//! thousands separators, trailing `%`, and `--` for "no value".

use serde_json::{Map, Value};
use vtrack_core::{CoreError, PerformanceMetrics, VideoPerformance};

use crate::types::{
    COL_ATTRIBUTED_GMV, COL_BUYERS, COL_COMMENTS, COL_CREATOR, COL_CTOR, COL_CTR,
    COL_FINISH_RATE, COL_GPM, COL_LIKES, COL_NEW_FOLLOWERS, COL_ORDERS, COL_PRODUCTS,
    COL_PRODUCT_CLICKS, COL_PRODUCT_IMPRESSIONS, COL_SHARES, COL_TIME, COL_UNIT_SALES,
    COL_VIDEO_ID, COL_VIDEO_INFO, COL_VIDEO_REVENUE, COL_VV, COL_V_TO_L_CLICKS,
    COL_V_TO_L_RATE, REQUIRED_COLUMNS,
};

const NO_VALUE: &str = "--";

/// Decode every row of a snapshot.
///
/// Column presence is checked for all rows before any cell is decoded, so a
/// schema problem is always reported as such.
///
/// # Errors
///
/// Returns [`CoreError::Schema`] naming the first missing column, or
/// [`CoreError::Validation`] naming the row and column of a malformed cell.
pub fn decode_rows(rows: &[Map<String, Value>]) -> Result<Vec<VideoPerformance>, CoreError> {
    for row in rows {
        if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !row.contains_key(**c)) {
            return Err(CoreError::Schema {
                column: (*column).to_string(),
            });
        }
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| decode_row(i + 1, row))
        .collect()
}

fn decode_row(row_number: usize, row: &Map<String, Value>) -> Result<VideoPerformance, CoreError> {
    let cell = |column: &str| row.get(column).unwrap_or(&Value::Null);
    let bad = |column: &str, reason: String| {
        CoreError::Validation(format!("row {row_number}, column '{column}': {reason}"))
    };

    let count = |column: &str| parse_count(cell(column)).map_err(|r| bad(column, r));
    let money = |column: &str| parse_money(cell(column)).map_err(|r| bad(column, r));
    let rate = |column: &str| parse_percentage(cell(column)).map_err(|r| bad(column, r));

    let video_id = video_id_text(cell(COL_VIDEO_ID))
        .ok_or_else(|| bad(COL_VIDEO_ID, "video id is empty".to_string()))?;

    Ok(VideoPerformance {
        video_id,
        video_info: text(cell(COL_VIDEO_INFO)),
        publish_time: text(cell(COL_TIME)),
        creator_name: text(cell(COL_CREATOR)),
        products: text(cell(COL_PRODUCTS)),
        metrics: PerformanceMetrics {
            vv: count(COL_VV)?,
            likes: count(COL_LIKES)?,
            comments: count(COL_COMMENTS)?,
            shares: count(COL_SHARES)?,
            new_followers: count(COL_NEW_FOLLOWERS)?,
            v_to_l_clicks: count(COL_V_TO_L_CLICKS)?,
            product_impressions: count(COL_PRODUCT_IMPRESSIONS)?,
            product_clicks: count(COL_PRODUCT_CLICKS)?,
            buyers: count(COL_BUYERS)?,
            orders: count(COL_ORDERS)?,
            unit_sales: count(COL_UNIT_SALES)?,
            video_revenue: money(COL_VIDEO_REVENUE)?,
            gpm: money(COL_GPM)?,
            shoppable_video_attributed_gmv: money(COL_ATTRIBUTED_GMV)?,
            ctr: rate(COL_CTR)?,
            v_to_l_rate: rate(COL_V_TO_L_RATE)?,
            video_finish_rate: rate(COL_FINISH_RATE)?,
            ctor: rate(COL_CTOR)?,
        },
    })
}

/// Decode a rate cell into a percentage.
///
/// `"4.2%"` and `4.2` both become `Some(4.2)`; `"--"`, `""`, and `null`
/// become `None`.
///
/// # Errors
///
/// Returns a reason string if the cell is neither a number nor a numeric
/// string.
pub fn parse_percentage(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("'{n}' is not a finite number")),
        Value::String(s) => {
            let trimmed = s.trim();
            if is_blank(trimmed) {
                return Ok(None);
            }
            let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            parse_float(digits).map(Some)
        }
        Value::Null => Ok(None),
        other => Err(format!("expected a percentage, got {other}")),
    }
}

/// Largest count a single cell may hold. Lifetime totals are `SUM`s of
/// these, so the bound keeps them far inside `i64`.
pub const MAX_COUNT: i64 = 1_000_000_000_000;

/// A non-negative integer counter up to [`MAX_COUNT`]. Blank cells count as
/// zero.
fn parse_count(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => integral(n.as_f64(), &n.to_string())?,
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if is_blank(trimmed) {
                return Ok(0);
            }
            let cleaned = trimmed.replace(',', "");
            match cleaned.parse::<i64>() {
                Ok(i) => i,
                Err(_) => integral(cleaned.parse::<f64>().ok(), trimmed)?,
            }
        }
        Value::Null => return Ok(0),
        other => return Err(format!("expected a count, got {other}")),
    };

    if parsed < 0 {
        return Err(format!("count must not be negative, got {parsed}"));
    }
    if parsed > MAX_COUNT {
        return Err(format!("count {parsed} exceeds the maximum of {MAX_COUNT}"));
    }
    Ok(parsed)
}

/// Exports sometimes render counters as `5000.0`.
#[allow(clippy::cast_possible_truncation)]
fn integral(value: Option<f64>, raw: &str) -> Result<i64, String> {
    match value {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
        _ => Err(format!("'{raw}' is not a whole number")),
    }
}

/// A non-negative monetary amount. Blank cells count as zero.
fn parse_money(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("'{n}' is not a finite number"))?,
        Value::String(s) => {
            let trimmed = s.trim();
            if is_blank(trimmed) {
                return Ok(0.0);
            }
            let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
            parse_float(digits)?
        }
        Value::Null => return Ok(0.0),
        other => return Err(format!("expected an amount, got {other}")),
    };

    if parsed < 0.0 {
        return Err(format!("amount must not be negative, got {parsed}"));
    }
    Ok(parsed)
}

fn parse_float(raw: &str) -> Result<f64, String> {
    let cleaned = raw.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(format!("'{raw}' is not a number")),
    }
}

/// Video IDs are long integers that some exports emit as numbers; compare
/// them as trimmed decimal strings.
fn video_id_text(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !is_blank(s.trim()) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_blank(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed == NO_VALUE
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
