use std::backtrace::Backtrace;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// ModelError
///
/// Outcomes of a repository call that are not a plain success. `NoRecord`,
/// `DuplicateEmail` and `InvalidCredentials` are expected and handled by the
/// calling handler; the remaining variants are genuine failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no matching record found")]
    NoRecord,
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

/// AppError
///
/// The single error type returned by handlers and middleware. Anything that is
/// not a client-facing condition collapses into `ServerError`, which is logged
/// with a backtrace while the client only ever sees the generic status text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("client error: {0}")]
    ClientError(StatusCode),
    #[error("server error: {0}")]
    ServerError(String),
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NoRecord => AppError::NotFound,
            other => AppError::ServerError(other.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::ServerError(format!("session error: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ClientError(status) => status,
            AppError::ServerError(ref message) => {
                let trace = Backtrace::force_capture();
                tracing::error!(error = %message, "{trace}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        status_text_response(status)
    }
}

/// Plain-text response carrying only the canonical reason phrase of `status`.
pub fn status_text_response(status: StatusCode) -> Response {
    let text = status.canonical_reason().unwrap_or("Unknown Status");
    (status, text).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
