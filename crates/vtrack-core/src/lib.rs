pub mod app_config;
pub mod config;
pub mod error;
pub mod metrics;
pub mod performance;
pub mod settings;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use metrics::{Aggregation, Metric, Timeframe, WeekStart};
pub use performance::{
    DailyMetrics, DailyScore, EngagementSample, PerformanceMetrics, Snapshot, VideoPerformance,
    VideoScore,
};
pub use settings::{Settings, SettingsStore, DEFAULT_VV_THRESHOLD};
