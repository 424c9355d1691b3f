//! Signup flow: OTP issuance then OTP-gated account creation.

use crate::api::{
    email::EmailMessage,
    handlers::auth::{
        error::{field_error, AuthError, FieldError},
        otp::{OtpOutcome, OtpPurpose},
        password::hash_password,
        session::session_cookie,
        state::AuthState,
        storage::{CreateOutcome, NewUser},
        types::{MessageResponse, SendOtpRequest, SendOtpResponse, VerifyOtpRequest},
        utils::{normalize_email, valid_email, valid_mobile, valid_name, valid_otp, valid_password},
    },
};
use anyhow::Context;
use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument};

fn validate_profile(name: &str, email: &str, mobile: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !valid_name(name) {
        errors.push(field_error(
            "name",
            "Name must be at least 3 characters long",
        ));
    }
    if !valid_email(email) {
        errors.push(field_error("email", "Enter valid email"));
    }
    if !valid_mobile(mobile) {
        errors.push(field_error(
            "mobile",
            "Enter valid 10-digit mobile number",
        ));
    }
    if !valid_password(password) {
        errors.push(field_error(
            "password",
            "Password must be at least 5 characters long",
        ));
    }
    errors
}

/// Start signup: validate the profile, reject addresses already on file,
/// then issue and email a short-lived code.
///
/// The email goes out inline; if delivery fails the code is unusable by the
/// client anyway, so the request fails with a 500.
#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    tag = "auth",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code issued and emailed", body = SendOtpResponse),
        (status = 400, description = "Validation failure or duplicate account"),
        (status = 500, description = "Email delivery failed"),
    )
)]
#[instrument(skip_all)]
pub async fn send_otp(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> Result<Response, AuthError> {
    // A missing or malformed body validates like an empty submission, so the
    // client always gets the per-field errors array.
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let email = normalize_email(&payload.email);
    let errors = validate_profile(&payload.name, &email, &payload.mobile, &payload.password);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    if state.users().find_by_email(&email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }
    if state.users().find_by_mobile(&payload.mobile).await?.is_some() {
        return Err(AuthError::DuplicateMobile);
    }

    let ttl = Duration::seconds(state.config().signup_otp_ttl_seconds());
    let (code, expires_at) = state.otp().issue(&email, OtpPurpose::Signup, ttl).await;

    let mailer = state.mailer();
    let message = EmailMessage::signup_otp(&email, &code);
    tokio::task::spawn_blocking(move || mailer.send(&message))
        .await
        .context("email task panicked")?
        .context("failed to send signup code")?;

    info!(email = %email, "signup code issued");

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
        expiration_time: expires_at.timestamp_millis(),
    })
    .into_response())
}

/// Finish signup: consume the code, create the account, and establish a
/// session in one step.
#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account created, session cookie set", body = MessageResponse),
        (status = 400, description = "Invalid or expired code, or duplicate account"),
    )
)]
#[instrument(skip_all)]
pub async fn verify_otp(
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
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
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    match state
        .otp()
        .verify(&email, &payload.otp, OtpPurpose::Signup)
        .await
    {
        OtpOutcome::Valid => {}
        OtpOutcome::Expired => return Err(AuthError::OtpExpired),
        OtpOutcome::NotFound | OtpOutcome::Mismatch | OtpOutcome::WrongPurpose => {
            return Err(AuthError::InvalidOtp)
        }
    }

    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("hash task panicked")??;

    let created = state
        .users()
        .create(NewUser {
            name: payload.name.clone(),
            email: email.clone(),
            mobile: payload.mobile.clone(),
            password_hash,
        })
        .await?;
    let user = match created {
        CreateOutcome::Created(user) => user,
        // The constraint race does not say which column collided, so the
        // message names neither.
        CreateOutcome::Conflict => return Err(AuthError::AccountExists),
    };

    let token = state
        .tokens()
        .mint_with_ttl(
            user.id,
            &user.email,
            Duration::seconds(state.config().session_ttl_seconds()),
        )
        .context("failed to sign session token")?;

    info!(email = %user.email, "account created");

    Ok((
        [(header::SET_COOKIE, session_cookie(state.config(), &token))],
        Json(MessageResponse {
            success: true,
            message: "User created successfully".to_string(),
        }),
    )
        .into_response())
}
