use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level configuration, read once at startup.
///
/// User-adjustable settings (`vv_threshold`, `week_start`) are not part of
/// this struct; they live in the settings document at `settings_path`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
    pub settings_path: PathBuf,
    pub env: Environment,
    pub log_level: String,
    pub db_acquire_timeout_secs: u64,
    pub db_busy_timeout_secs: u64,
}
