use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{ConstraintError, EventField};
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required field: {0}")]
    MissingField(EventField),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::MissingField(field) => {
                warn!(field = %field, "Rejected submission with missing field");
            }
            AppError::ValidationError(msg) | AppError::PayloadTooLarge(msg) => {
                warn!(details = %msg, "Rejected submission that failed validation");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal error");
            }
        }
    }
}

impl From<ConstraintError> for AppError {
    fn from(err: ConstraintError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(e) => e.into(),
            StoreError::Database(e) => AppError::DatabaseError(e),
            StoreError::Unavailable(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(rejection.body_text());
        }
        AppError::ValidationError(rejection.body_text())
    }
}

// Listing accepts any well-formed query string, so a rejection here is ours.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InternalServerError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal details
        self.log();

        match self {
            AppError::MissingField(field) => {
                error_response(format!("Missing required field: {field}"), None, status)
            }
            AppError::ValidationError(details) => {
                error_response("Validation error", Some(details), status)
            }
            AppError::PayloadTooLarge(details) => {
                error_response("Payload too large", Some(details), status)
            }
            // Database errors can leak connection details, keep them in the logs
            AppError::DatabaseError(_) => error_response(
                "Internal server error",
                Some("A database error occurred".to_string()),
                status,
            ),
            AppError::InternalServerError(details) => {
                error_response("Internal server error", Some(details), status)
            }
        }
    }
}
