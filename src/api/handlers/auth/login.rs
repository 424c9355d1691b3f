//! Login flow with a courtesy new-login notification email.

use crate::api::{
    email::{send_detached, DeviceInfo, EmailMessage},
    handlers::auth::{
        error::{field_error, AuthError},
        password::verify_password,
        session::session_cookie,
        state::AuthState,
        types::{LoginRequest, LoginResponse},
        utils::{normalize_email, valid_email, valid_password},
    },
};
use anyhow::Context;
use axum::{
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Coarse classification of the client's User-Agent for the notification
/// email. Best effort only; unknowns fall back to "Unknown".
#[must_use]
pub(crate) fn device_info(user_agent: &str) -> DeviceInfo {
    let device = if user_agent.contains("Mobi") {
        "Mobile"
    } else if user_agent.contains("Tablet") || user_agent.contains("iPad") {
        "Tablet"
    } else if user_agent.is_empty() {
        "Unknown"
    } else {
        "Desktop"
    };

    let browser = if user_agent.contains("Edg") {
        "Edge"
    } else if user_agent.contains("OPR") {
        "Opera"
    } else if user_agent.contains("Chrome") {
        "Chrome"
    } else if user_agent.contains("Safari") {
        "Safari"
    } else if user_agent.contains("Firefox") {
        "Firefox"
    } else {
        "Unknown"
    };

    // Android UAs also contain "Linux", so check Android first.
    let os = if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else if user_agent.contains("Mac OS X") {
        "Mac OS X"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    };

    DeviceInfo {
        device: device.to_string(),
        browser: browser.to_string(),
        os: os.to_string(),
    }
}

/// Authenticate and establish a session.
///
/// Unknown email and wrong password produce the same response so the
/// endpoint does not confirm which addresses have accounts.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookie set", body = LoginResponse),
        (status = 400, description = "Validation failure or bad credentials"),
    )
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    // A missing or malformed body validates like an empty submission.
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let email = normalize_email(&payload.email);
    let mut errors = Vec::new();
    if !valid_email(&email) {
        errors.push(field_error("email", "Enter valid email"));
    }
    if !valid_password(&payload.password) {
        errors.push(field_error(
            "password",
            "Password must be at least 5 characters long",
        ));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let Some(user) = state.users().find_by_email(&email).await? else {
        debug!(email = %email, "login attempt for unknown email");
        return Err(AuthError::BadCredentials);
    };

    let password = payload.password.clone();
    let hash = user.password_hash.clone();
    let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("verify task panicked")?;
    if !matched {
        debug!(email = %email, "login attempt with wrong password");
        return Err(AuthError::BadCredentials);
    }

    let token = state
        .tokens()
        .mint_with_ttl(
            user.id,
            &user.email,
            Duration::seconds(state.config().session_ttl_seconds()),
        )
        .context("failed to sign session token")?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    send_detached(
        state.mailer(),
        EmailMessage::login_notification(&user.email, &user.name, &device_info(user_agent)),
    );

    info!(email = %user.email, "login succeeded");

    Ok((
        [(header::SET_COOKIE, session_cookie(state.config(), &token))],
        Json(LoginResponse {
            success: true,
            user: user.public(),
        }),
    )
        .into_response())
}
