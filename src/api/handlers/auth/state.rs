//! Shared state for the auth handlers.

use crate::api::{
    email::EmailSender,
    handlers::auth::{otp::OtpStore, storage::UserRepository, token::SessionTokens},
};
use std::sync::Arc;

/// Tunables for the auth flows. TTLs default to the production values and
/// can be overridden with the `with_*` builders (tests shorten them).
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    signup_otp_ttl_seconds: i64,
    reset_otp_ttl_seconds: i64,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: &str) -> Self {
        Self {
            frontend_base_url: frontend_base_url.trim_end_matches('/').to_string(),
            signup_otp_ttl_seconds: 60,
            reset_otp_ttl_seconds: 300,
            session_ttl_seconds: 86_400,
        }
    }

    #[must_use]
    pub fn with_signup_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.signup_otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn signup_otp_ttl_seconds(&self) -> i64 {
        self.signup_otp_ttl_seconds
    }

    #[must_use]
    pub fn reset_otp_ttl_seconds(&self) -> i64 {
        self.reset_otp_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Session cookies are marked `Secure` only when the frontend is served
    /// over https, so local http dev keeps working.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Everything the auth handlers need, shared via `Extension<Arc<AuthState>>`.
pub struct AuthState {
    config: AuthConfig,
    otp: OtpStore,
    tokens: SessionTokens,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn EmailSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        tokens: SessionTokens,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            otp: OtpStore::new(),
            tokens,
            users,
            mailer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn otp(&self) -> &OtpStore {
        &self.otp
    }

    #[must_use]
    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[must_use]
    pub fn mailer(&self) -> Arc<dyn EmailSender> {
        Arc::clone(&self.mailer)
    }
}
