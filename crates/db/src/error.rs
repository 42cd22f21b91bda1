//! Storage error model.

use thiserror::Error;

/// Postgres error code raised when a unique constraint rejects a write.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Storage-layer failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// A unique constraint rejected the write (Postgres 23505).
    ///
    /// Callers translate this into a domain-level validation error; the raw
    /// code never reaches API clients.
    #[error("unique constraint violation on {constraint}")]
    UniqueViolation { constraint: String },

    /// An update or insert was issued with no column values.
    #[error("no values to set")]
    NoValues,

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION_CODE) {
                return DbError::UniqueViolation {
                    constraint: db.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        DbError::Sqlx(err)
    }
}
