//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt credential: {0}")]
    CorruptCredential(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl From<dotci_core::Error> for DbError {
    fn from(err: dotci_core::Error) -> Self {
        match err {
            dotci_core::Error::NotFound(what) => DbError::NotFound(what),
            dotci_core::Error::CorruptCredential(why) => DbError::CorruptCredential(why),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<DbError> for dotci_core::Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => dotci_core::Error::NotFound(what),
            DbError::CorruptCredential(why) => dotci_core::Error::CorruptCredential(why),
            other => dotci_core::Error::Internal(other.to_string()),
        }
    }
}
