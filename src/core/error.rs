use crate::invites::InviteError;
use crate::store::StoreError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            other => {
                error!("Database error: {:?}", other);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found("Resource not found"),
            StoreError::AlreadyExists { .. } => Self::conflict("Resource already exists"),
            StoreError::PreconditionFailed { .. } => {
                Self::conflict("Resource was modified concurrently")
            }
            StoreError::Unavailable(details) => {
                Self::service_unavailable("Store unavailable").with_details(details)
            }
            StoreError::Database(db) => Self::from(db),
            other => {
                error!("Store error: {}", other);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<InviteError> for AppError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::NotFound(id) => Self::not_found("Invite not found").with_details(id),
            InviteError::InvalidArgument(details) => {
                Self::bad_request("Invalid request").with_details(details)
            }
            InviteError::Forbidden(details) => {
                Self::forbidden("Operation not allowed").with_details(details)
            }
            InviteError::Conflict(details) => Self::conflict("Conflict").with_details(details),
            InviteError::TransientStoreFailure(source) => {
                error!("Invite store failure: {}", source);
                Self::service_unavailable("Store temporarily unavailable, retry")
            }
        }
    }
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        Self::internal_server_error("Internal server error").with_details(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
