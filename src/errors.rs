//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Message returned when a concurrent insert trips a unique constraint.
pub const DUPLICATE_ACCOUNT_MESSAGE: &str =
    "An account with that username or email already exists.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Validation
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body: `{ "errors": { "code": ..., "message": [...] } }`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    errors: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: Vec<String>,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing messages (hides internal details)
    fn user_messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(messages) => messages.clone(),
            AppError::BadRequest(msg) => vec![msg.clone()],

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                vec!["A database error occurred".to_string()]
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                vec!["An internal error occurred".to_string()]
            }

            _ => vec![self.to_string()],
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            errors: ErrorBody {
                code: self.code(),
                message: self.user_messages(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    /// Single-message validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Map an insert failure, turning unique-constraint violations into
    /// the user-correctable "already exists" validation error.
    pub fn from_insert(err: DbErr) -> Self {
        let violation = err.sql_err();
        Self::from_insert_violation(err, violation)
    }

    fn from_insert_violation(err: DbErr, violation: Option<SqlErr>) -> Self {
        match violation {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::info!(detail = %detail, "Insert rejected by unique constraint");
                AppError::validation(DUPLICATE_ACCOUNT_MESSAGE)
            }
            _ => AppError::Database(err),
        }
    }
}
