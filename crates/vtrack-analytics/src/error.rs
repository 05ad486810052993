use thiserror::Error;
use vtrack_core::CoreError;
use vtrack_db::DbError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}
