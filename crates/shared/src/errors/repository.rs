use sqlx::Error as SqlxError;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Custom: {0}")]
    Custom(String),
}

impl RepositoryError {
    /// Turns a unique-constraint violation into `AlreadyExists`, keeping every
    /// other database error as-is.
    pub fn from_unique(err: SqlxError, what: &str) -> Self {
        if let SqlxError::Database(db_err) = &err
            && db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
        {
            return RepositoryError::AlreadyExists(what.to_string());
        }

        RepositoryError::Sqlx(err)
    }
}
