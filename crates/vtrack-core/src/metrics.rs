//! Metric, timeframe, and week-start vocabulary shared by the store and the
//! aggregation engine.

use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

/// Anchor weekday for weekly bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    #[must_use]
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

impl std::fmt::Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Sunday => write!(f, "Sunday"),
            WeekStart::Monday => write!(f, "Monday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" => Ok(WeekStart::Sunday),
            "monday" => Ok(WeekStart::Monday),
            _ => Err(ConfigError::Validation(format!(
                "week start must be 'Sunday' or 'Monday', got '{s}'"
            ))),
        }
    }
}

/// Bucket width for time-series queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Daily => write!(f, "daily"),
            Timeframe::Weekly => write!(f, "weekly"),
            Timeframe::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Timeframe::Daily),
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            _ => Err(CoreError::Validation(format!(
                "timeframe must be daily, weekly, or monthly, got '{s}'"
            ))),
        }
    }
}

/// How a metric collapses a period of daily rows into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Plain sum of the daily values.
    Sum,
    /// `Σ numerator / Σ denominator × 100`, recomputed from raw components.
    Ratio {
        numerator: Metric,
        denominator: Metric,
    },
    /// Arithmetic mean of a stored daily percentage.
    Mean,
}

/// Every metric stored in `daily_performance` that can be charted.
///
/// This is the allow-list for time-series queries: a name that does not
/// parse into a `Metric` never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Shares,
    NewFollowers,
    VToLClicks,
    ProductImpressions,
    ProductClicks,
    Buyers,
    Orders,
    UnitSales,
    VideoRevenue,
    Gpm,
    AttributedGmv,
    Ctr,
    VToLRate,
    VideoFinishRate,
    Ctor,
}

impl Metric {
    pub const ALL: [Metric; 18] = [
        Metric::Views,
        Metric::Likes,
        Metric::Comments,
        Metric::Shares,
        Metric::NewFollowers,
        Metric::VToLClicks,
        Metric::ProductImpressions,
        Metric::ProductClicks,
        Metric::Buyers,
        Metric::Orders,
        Metric::UnitSales,
        Metric::VideoRevenue,
        Metric::Gpm,
        Metric::AttributedGmv,
        Metric::Ctr,
        Metric::VToLRate,
        Metric::VideoFinishRate,
        Metric::Ctor,
    ];

    /// Column name in `daily_performance`.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Metric::Views => "vv",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Shares => "shares",
            Metric::NewFollowers => "new_followers",
            Metric::VToLClicks => "v_to_l_clicks",
            Metric::ProductImpressions => "product_impressions",
            Metric::ProductClicks => "product_clicks",
            Metric::Buyers => "buyers",
            Metric::Orders => "orders",
            Metric::UnitSales => "unit_sales",
            Metric::VideoRevenue => "video_revenue",
            Metric::Gpm => "gpm",
            Metric::AttributedGmv => "shoppable_video_attributed_gmv",
            Metric::Ctr => "ctr",
            Metric::VToLRate => "v_to_l_rate",
            Metric::VideoFinishRate => "video_finish_rate",
            Metric::Ctor => "ctor",
        }
    }

    #[must_use]
    pub fn aggregation(self) -> Aggregation {
        match self {
            Metric::Ctr => Aggregation::Ratio {
                numerator: Metric::ProductClicks,
                denominator: Metric::Views,
            },
            Metric::Ctor => Aggregation::Ratio {
                numerator: Metric::Orders,
                denominator: Metric::ProductClicks,
            },
            Metric::VToLRate | Metric::VideoFinishRate => Aggregation::Mean,
            _ => Aggregation::Sum,
        }
    }

    /// True for metrics stored as a percentage in `[0, 100]`.
    #[must_use]
    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            Metric::Ctr | Metric::Ctor | Metric::VToLRate | Metric::VideoFinishRate
        )
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "views" {
            return Ok(Metric::Views);
        }
        Metric::ALL
            .into_iter()
            .find(|m| m.column() == wanted)
            .ok_or_else(|| CoreError::UnknownMetric(s.to_string()))
    }
}
