//! Session cookie plumbing plus the `check-auth` and `logout` endpoints.
//!
//! Sessions are stateless: the cookie value is a signed token and validity
//! is decided entirely from its signature and expiry plus a liveness lookup
//! of the account. There is no server-side session table, so `logout` only
//! clears the cookie; the token itself stays cryptographically valid until
//! its expiry.

use crate::api::handlers::auth::{
    state::{AuthConfig, AuthState},
    types::CheckAuthResponse,
};
use axum::{
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

pub(crate) const SESSION_COOKIE: &str = "auth_token";

/// Build the `Set-Cookie` value that establishes a session.
#[must_use]
pub(crate) fn session_cookie(config: &AuthConfig, token: &str) -> String {
    let secure = if config.session_cookie_secure() {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}{secure}",
        config.session_ttl_seconds()
    )
}

/// Build the `Set-Cookie` value that drops the session.
#[must_use]
pub(crate) fn clear_session_cookie(config: &AuthConfig) -> String {
    let secure = if config.session_cookie_secure() {
        "; Secure"
    } else {
        ""
    };
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0{secure}")
}

/// Pull the session token from the request, preferring a bearer
/// `Authorization` header and falling back to the session cookie.
#[must_use]
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Report whether the caller holds a live session.
///
/// Always answers 200: a missing, forged, or expired token, a token whose
/// account has since been deleted, and even a storage failure during the
/// liveness lookup all collapse to `isLoggedIn: false`.
#[utoipa::path(
    get,
    path = "/api/auth/check-auth",
    tag = "auth",
    responses(
        (status = 200, description = "Session status", body = CheckAuthResponse),
    )
)]
#[instrument(skip_all)]
pub async fn check_auth(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Json<CheckAuthResponse> {
    let logged_out = Json(CheckAuthResponse {
        is_logged_in: false,
        user: None,
    });

    let Some(token) = extract_session_token(&headers) else {
        return logged_out;
    };
    let Some((user_id, _)) = state.tokens().verify_subject(&token) else {
        return logged_out;
    };

    match state.users().find_by_id(user_id).await {
        Ok(Some(user)) => Json(CheckAuthResponse {
            is_logged_in: true,
            user: Some(user.public()),
        }),
        Ok(None) => logged_out,
        Err(err) => {
            // A storage hiccup must not break the frontend's auth probe.
            debug!("check-auth lookup failed: {err:#}");
            logged_out
        }
    }
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared"),
    )
)]
#[instrument(skip_all)]
pub async fn logout(Extension(state): Extension<Arc<AuthState>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.config()))],
        Json(json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}
