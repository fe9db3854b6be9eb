use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Writer, async_trait};
use serde::Serialize;
use thiserror::Error;

use rollcall_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] rollcall_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] rollcall_core::error::CoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("A finalization sweep is already running")]
    SweepInProgress,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => match err {
                ServiceError::NotEnrolled { .. } | ServiceError::ValidationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::StoreUnavailable(_) | ServiceError::Timeout { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ServiceError::FaceService(_) => StatusCode::BAD_GATEWAY,
                ServiceError::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SweepInProgress => StatusCode::CONFLICT,
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients; store internals are not echoed back.
    fn public_message(&self) -> String {
        let status = self.status_code();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            "Service temporarily unavailable".to_string()
        } else if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        res.status_code(status);
        res.render(Json(ErrorResponse {
            error: self.public_message(),
        }));
    }
}
