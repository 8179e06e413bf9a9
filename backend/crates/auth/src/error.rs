//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordHashError;
use serde::Serialize;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Field-level validation messages, keyed by form field name
///
/// Only the first message recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity record for the requested id
    #[error("User not found")]
    UserNotFound,

    /// Email already registered (unique constraint)
    #[error("Address is already in use")]
    DuplicateEmail,

    /// Unknown email, inactive account or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Form input rejected
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Submitted anti-forgery token missing or wrong
    #[error("Invalid CSRF token")]
    CsrfMismatch,

    /// Stored password hash is not a readable PHC string
    #[error("Stored password hash unreadable for user {0}")]
    CorruptPasswordHash(i64),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::DuplicateEmail => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::CsrfMismatch => ErrorKind::BadRequest,
            AuthError::CorruptPasswordHash(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the failure came from storage or another backend fault
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            AuthError::CorruptPasswordHash(_) | AuthError::Database(_) | AuthError::Internal(_)
        )
    }

    /// Convert to AppError
    ///
    /// Store failures keep the original error as `source` only; the client
    /// sees a generic detail.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::internal("Internal server error")
                .with_source(std::io::Error::other(msg)),
            AuthError::CorruptPasswordHash(user_id) => AppError::internal("Internal server error")
                .with_source(std::io::Error::other(format!(
                    "Stored password hash unreadable for user {user_id}"
                ))),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::CorruptPasswordHash(user_id) => {
                tracing::error!(user_id, "Stored password hash unreadable");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::CsrfMismatch => {
                tracing::warn!("CSRF token mismatch");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}
