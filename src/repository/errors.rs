//! Errors surfaced by the persistence layer.

use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    /// A unique index rejected the write.
    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => RepositoryError::Conflict(message),
                    DatabaseErrorKind::ForeignKeyViolation => RepositoryError::ConstraintViolation(
                        format!("foreign key: {message}"),
                    ),
                    DatabaseErrorKind::NotNullViolation => {
                        RepositoryError::ConstraintViolation(format!("not null: {message}"))
                    }
                    DatabaseErrorKind::CheckViolation => {
                        RepositoryError::ConstraintViolation(format!("check: {message}"))
                    }
                    _ => RepositoryError::DatabaseError(message),
                }
            }
            DieselError::SerializationError(e) => {
                RepositoryError::ValidationError(format!("serialization: {e}"))
            }
            DieselError::DeserializationError(e) => {
                RepositoryError::ValidationError(format!("deserialization: {e}"))
            }
            DieselError::QueryBuilderError(e) => {
                RepositoryError::ValidationError(format!("query builder: {e}"))
            }
            DieselError::RollbackTransaction
            | DieselError::AlreadyInTransaction
            | DieselError::NotInTransaction
            | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(format!("transaction: {err}"))
            }
            _ => RepositoryError::Unexpected(err.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_preserved() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn transaction_errors_become_database_errors() {
        assert!(matches!(
            RepositoryError::from(DieselError::RollbackTransaction),
            RepositoryError::DatabaseError(_)
        ));
    }
}
