use thiserror::Error;

/// Failures raised by the ingestion, aggregation, and scoring core.
///
/// `Schema`, `Validation`, and `UnknownMetric` are caused by the caller's
/// input and can be retried once the input is fixed.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing expected column '{column}'")]
    Schema { column: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("metric '{0}' is missing after calculation")]
    MetricComputation(String),
}

impl CoreError {
    /// Whether the operation can succeed after the input is corrected.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Schema { .. } | CoreError::Validation(_) | CoreError::UnknownMetric(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to access settings file {path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsParse(#[source] serde_json::Error),

    #[error("invalid setting: {0}")]
    Validation(String),
}
