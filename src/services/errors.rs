//! Error type returned by every service function.

use thiserror::Error;

use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller lacks the role or membership the operation needs.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// User input was rejected; the message is safe to show.
    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_keep_their_meaning() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::Conflict("email".into())),
            ServiceError::Conflict(msg) if msg == "email"
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::DatabaseError("disk".into())),
            ServiceError::Repository(_)
        ));
    }
}
