//! Conversions from value-object errors into the layered error types.
//!
//! The domain layer stays free of repository and service concerns; callers
//! that only enable the `data` feature still get the repository conversion.

#[cfg(feature = "server")]
use crate::domain::followup::FollowupError;
use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;
#[cfg(feature = "server")]
use crate::services::ServiceError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

/// Lifecycle violations are conflicts with the stored state.
#[cfg(feature = "server")]
impl From<FollowupError> for ServiceError {
    fn from(val: FollowupError) -> Self {
        match val {
            FollowupError::SnoozeInPast => ServiceError::Form(val.to_string()),
            FollowupError::Closed(_) | FollowupError::AlreadyOpen => {
                ServiceError::Conflict(val.to_string())
            }
        }
    }
}
