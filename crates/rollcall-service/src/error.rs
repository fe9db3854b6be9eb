use std::time::Duration;

use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Student {student_id} is not enrolled in class {class_id}")]
    NotEnrolled { class_id: i32, student_id: i32 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rollcall_db::error::DbError),

    #[error("Store call '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Face service error: {0}")]
    FaceService(String),

    #[error(transparent)]
    CoreError(#[from] rollcall_core::error::CoreError),
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::StoreUnavailable(err.into())
    }
}

impl ServiceError {
    /// ## Summary
    /// Maps a unique-constraint violation to a `ValidationError` carrying `message`;
    /// any other database error becomes `StoreUnavailable`.
    #[must_use]
    pub fn from_insert(err: diesel::result::Error, message: &str) -> Self {
        let err = rollcall_db::error::DbError::from(err);
        if err.is_unique_violation() {
            Self::ValidationError(message.to_string())
        } else {
            Self::StoreUnavailable(err)
        }
    }

    /// ## Summary
    /// Returns true for transient failures a caller may retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Timeout { .. })
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
