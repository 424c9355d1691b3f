//! Password reset flow: OTP issuance, then code-gated hash rotation.

use crate::api::{
    email::{send_detached, EmailMessage},
    handlers::auth::{
        error::{field_error, AuthError},
        otp::{OtpOutcome, OtpPurpose},
        password::hash_password,
        state::AuthState,
        types::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest, SendOtpResponse},
        utils::{normalize_email, valid_email, valid_otp, valid_password},
    },
};
use anyhow::Context;
use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument};

/// Start a reset: issue and email a code for an existing account.
///
/// Unknown addresses are rejected with an explicit message, matching the
/// frontend contract this service replaced.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Code issued and emailed", body = SendOtpResponse),
        (status = 400, description = "Validation failure or unknown email"),
        (status = 500, description = "Email delivery failed"),
    )
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<Response, AuthError> {
    // A missing or malformed body validates like an empty submission.
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return Err(AuthError::Validation(vec![field_error(
            "email",
            "Enter valid email",
        )]));
    }

    if state.users().find_by_email(&email).await?.is_none() {
        return Err(AuthError::NoSuchUser);
    }

    let ttl = Duration::seconds(state.config().reset_otp_ttl_seconds());
    let (code, expires_at) = state
        .otp()
        .issue(&email, OtpPurpose::ResetPassword, ttl)
        .await;

    let mailer = state.mailer();
    let message = EmailMessage::reset_otp(&email, &code);
    tokio::task::spawn_blocking(move || mailer.send(&message))
        .await
        .context("email task panicked")?
        .context("failed to send reset code")?;

    info!(email = %email, "password reset code issued");

    Ok(Json(SendOtpResponse {
        success: true,
        message: "Password reset OTP sent successfully".to_string(),
        expiration_time: expires_at.timestamp_millis(),
    })
    .into_response())
}

/// Finish a reset: consume the code and rotate the stored hash. Existing
/// session tokens stay valid until their own expiry.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password rotated", body = MessageResponse),
        (status = 400, description = "Invalid or expired code, or unknown email"),
    )
)]
#[instrument(skip_all)]
pub async fn reset_password(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<Response, AuthError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let email = normalize_email(&payload.email);
    let mut errors = Vec::new();
    if !valid_email(&email) {
        errors.push(field_error("email", "Enter valid email"));
    }
    if !valid_otp(&payload.otp) {
        errors.push(field_error("otp", "OTP must be a 6-digit number"));
    }
    if !valid_password(&payload.new_password) {
        errors.push(field_error(
            "newPassword",
            "Password must be at least 5 characters long",
        ));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    match state
        .otp()
        .verify(&email, &payload.otp, OtpPurpose::ResetPassword)
        .await
    {
        OtpOutcome::Valid => {}
        OtpOutcome::Expired => return Err(AuthError::OtpExpired),
        OtpOutcome::NotFound | OtpOutcome::Mismatch | OtpOutcome::WrongPurpose => {
            return Err(AuthError::InvalidOtp)
        }
    }

    let new_password = payload.new_password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&new_password))
        .await
        .context("hash task panicked")??;

    let Some(user) = state.users().update_password(&email, &password_hash).await? else {
        return Err(AuthError::NoSuchUser);
    };

    send_detached(
        state.mailer(),
        EmailMessage::reset_confirmation(&user.email, &user.name),
    );

    info!(email = %user.email, "password reset");

    Ok(Json(MessageResponse {
        success: true,
        message: "Password reset successfully".to_string(),
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{
        password::verify_password,
        test_support::{state_with, TestStateOptions, TEST_PASSWORD},
    };
    use axum::{body::to_bytes, http::StatusCode};

    fn forgot(email: &str) -> ForgotPasswordRequest {
        ForgotPasswordRequest {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn forgot_password_without_payload_reports_field_errors() {
        let (state, _) = state_with(TestStateOptions::default()).await;
        let err = forgot_password(Extension(state), None)
            .await
            .expect_err("missing body");
        match err {
            AuthError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["email"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reset_password_without_payload_reports_field_errors() {
        let (state, _) = state_with(TestStateOptions::default()).await;
        let err = reset_password(Extension(state), None)
            .await
            .expect_err("missing body");
        match err {
            AuthError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["email", "otp", "newPassword"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn forgot_password_rejects_unknown_email() {
        let (state, _) = state_with(TestStateOptions::default()).await;
        let err = forgot_password(Extension(state), Some(Json(forgot("ghost@example.com"))))
            .await
            .expect_err("unknown email");
        assert!(matches!(err, AuthError::NoSuchUser));
    }

    #[tokio::test]
    async fn forgot_password_emails_a_code() {
        let (state, harness) = state_with(TestStateOptions::default()).await;
        harness.seed("Alice", "alice@example.com", "5551234567").await;

        let response = forgot_password(
            Extension(state),
            Some(Json(forgot("Alice@Example.com"))),
        )
        .await
        .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body["message"],
            serde_json::json!("Password reset OTP sent successfully")
        );
        assert!(body["expirationTime"].as_i64().is_some());

        let sent = harness.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(harness.last_code().is_some());
    }

    #[tokio::test]
    async fn forgot_password_surfaces_mail_failure_as_internal() {
        let (state, harness) = state_with(TestStateOptions {
            failing_mailer: true,
            ..TestStateOptions::default()
        })
        .await;
        harness.seed("Alice", "alice@example.com", "5551234567").await;

        let err = forgot_password(Extension(state), Some(Json(forgot("alice@example.com"))))
            .await
            .expect_err("mail failure");
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn reset_password_rotates_the_hash() {
        let (state, harness) = state_with(TestStateOptions::default()).await;
        harness.seed("Alice", "alice@example.com", "5551234567").await;
        forgot_password(
            Extension(Arc::clone(&state)),
            Some(Json(forgot("alice@example.com"))),
        )
        .await
        .expect("send");
        let code = harness.last_code().expect("code in email");

        let request = ResetPasswordRequest {
            email: "alice@example.com".to_string(),
            otp: code,
            new_password: "brand-new-pass".to_string(),
        };
        let response = reset_password(Extension(Arc::clone(&state)), Some(Json(request)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let stored = state
            .users()
            .find_by_email("alice@example.com")
            .await
            .expect("lookup")
            .expect("account exists");
        assert!(verify_password("brand-new-pass", &stored.password_hash));
        assert!(!verify_password(TEST_PASSWORD, &stored.password_hash));
    }

    #[tokio::test]
    async fn reset_password_rejects_signup_code() {
        let (state, harness) = state_with(TestStateOptions::default()).await;
        harness.seed("Alice", "alice@example.com", "5551234567").await;
        // Issue a code under the wrong purpose.
        let (code, _) = state
            .otp()
            .issue(
                "alice@example.com",
                OtpPurpose::Signup,
                Duration::seconds(60),
            )
            .await;

        let request = ResetPasswordRequest {
            email: "alice@example.com".to_string(),
            otp: code,
            new_password: "brand-new-pass".to_string(),
        };
        let err = reset_password(Extension(state), Some(Json(request)))
            .await
            .expect_err("wrong purpose");
        assert!(matches!(err, AuthError::InvalidOtp));
    }

    #[tokio::test]
    async fn reset_password_rejects_expired_code() {
        let (state, harness) = state_with(TestStateOptions {
            reset_otp_ttl_seconds: -1,
            ..TestStateOptions::default()
        })
        .await;
        harness.seed("Alice", "alice@example.com", "5551234567").await;
        forgot_password(
            Extension(Arc::clone(&state)),
            Some(Json(forgot("alice@example.com"))),
        )
        .await
        .expect("send");
        let code = harness.last_code().expect("code in email");

        let request = ResetPasswordRequest {
            email: "alice@example.com".to_string(),
            otp: code,
            new_password: "brand-new-pass".to_string(),
        };
        let err = reset_password(Extension(state), Some(Json(request)))
            .await
            .expect_err("expired code");
        assert!(matches!(err, AuthError::OtpExpired));
    }

    #[tokio::test]
    async fn reset_password_validates_new_password() {
        let (state, _) = state_with(TestStateOptions::default()).await;
        let request = ResetPasswordRequest {
            email: "alice@example.com".to_string(),
            otp: "123456".to_string(),
            new_password: "abc".to_string(),
        };
        let err = reset_password(Extension(state), Some(Json(request)))
            .await
            .expect_err("short password");
        match err {
            AuthError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "newPassword");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
