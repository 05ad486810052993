use std::collections::HashSet;

use vtrack_core::VideoPerformance;

/// A row is admitted when its video is already tracked or its views reach
/// the threshold.
#[must_use]
pub fn is_admitted(row: &VideoPerformance, existing_ids: &HashSet<String>, vv_threshold: u32) -> bool {
    existing_ids.contains(row.video_id.trim()) || row.metrics.vv >= i64::from(vv_threshold)
}

/// Keep the rows that pass [`is_admitted`], preserving input order.
#[must_use]
pub fn filter_admitted(
    rows: &[VideoPerformance],
    existing_ids: &HashSet<String>,
    vv_threshold: u32,
) -> Vec<VideoPerformance> {
    rows.iter()
        .filter(|row| is_admitted(row, existing_ids, vv_threshold))
        .cloned()
        .collect()
}
