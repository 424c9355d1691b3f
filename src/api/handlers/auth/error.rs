//! Flow-level error taxonomy and its response mapping.
//!
//! Every failure a flow can report maps to a `success: false` JSON body with
//! a stable message; unexpected internal errors are logged and surfaced as a
//! generic 500 without leaking details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Per-field validation failure, reported in the express-validator shape the
/// frontend already consumes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[must_use]
pub(crate) fn field_error(field: &'static str, message: &'static str) -> FieldError {
    FieldError { field, message }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("Sorry, user with this email already exists")]
    DuplicateEmail,

    #[error("Sorry, user with this mobile already exists")]
    DuplicateMobile,

    /// Storage-level uniqueness race at account creation; Postgres does not
    /// say which column collided, so neither does the message.
    #[error("Sorry, user with this email or mobile already exists")]
    AccountExists,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired")]
    OtpExpired,

    #[error("User with this email does not exist")]
    NoSuchUser,

    /// Deliberately ambiguous: the same text covers unknown-user and
    /// bad-password so responses don't reveal which branch was taken.
    #[error("Invalid email or password")]
    BadCredentials,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(errors) => json!({
                "success": false,
                "errors": errors,
            }),
            Self::Internal(err) => {
                // Log the chain; the client only sees a generic message.
                error!("internal error: {err:#}");
                json!({
                    "success": false,
                    "error": self.to_string(),
                })
            }
            _ => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
