use thiserror::Error;
use vtrack_core::CoreError;
use vtrack_db::DbError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} is not a valid snapshot document: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl IngestError {
    /// True when the snapshot itself is at fault, so other snapshots in the
    /// same batch can still be ingested.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        match self {
            IngestError::Io { .. } | IngestError::Json { .. } => true,
            IngestError::Core(e) => e.is_retryable(),
            IngestError::Db(DbError::Core(e)) => e.is_retryable(),
            IngestError::Db(_) => false,
        }
    }
}
