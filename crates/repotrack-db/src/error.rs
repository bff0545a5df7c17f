//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or format rule enforced by the store rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    InvalidInput(#[from] repotrack_core::Error),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let violated = match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_check_violation() =>
            {
                Some(db_err.constraint().unwrap_or("unknown").to_string())
            }
            _ => None,
        };

        match violated {
            Some(constraint) => DbError::ConstraintViolation(constraint),
            None => DbError::Database(err),
        }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
