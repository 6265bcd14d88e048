//! Application error type with HTTP response conversion.
//!
//! Every handler and service returns [`AppError`]. It pairs an HTTP status with an
//! [`anyhow::Error`] and renders as a JSON body of the form `{"message": "..."}`.
//!
//! | Kind | Constructor | Status |
//! |------|-------------|--------|
//! | Invalid input | [`AppError::bad_request`] | 400 |
//! | Authentication required | [`AppError::unauthorized`] | 401 |
//! | Invalid token | [`AppError::invalid_token`] | 403 |
//! | Forbidden | [`AppError::forbidden`] | 403 |
//! | Not found | [`AppError::not_found`] | 404 |
//! | Conflict | [`AppError::conflict`] | 409 |
//! | Invalid state | [`AppError::invalid_state`] | 400 |
//! | Internal | [`AppError::internal`] | 500 |
//!
//! Server errors never leak their detail unless [`set_expose_internal_errors`] was
//! switched on (development mode).

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Toggle whether 5xx responses carry the underlying error message.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::Relaxed);
}

fn expose_internal_errors() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed)
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// No credentials were presented.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }

    /// Credentials were presented but could not be verified.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    /// Authenticated, but the role or membership check failed.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    /// Uniqueness violation or a transition the state machine does not allow.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow!(message.into()))
    }

    /// The target exists but is not in a state that accepts the operation.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, anyhow!(message.into()))
    }

    /// The message sent to the client.
    pub fn message(&self) -> String {
        if self.status.is_server_error() && !expose_internal_errors() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "Request failed");
        }

        let body = Json(json!({
            "message": self.message()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
