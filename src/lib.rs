//! # nexauth
//!
//! Credential-management backend for NexGen WebCon: OTP-gated signup,
//! credential login, passcode-based password recovery, and stateless
//! session validation.
//!
//! ## Signup & recovery (OTP)
//!
//! Both flows are two-step: a `request` call issues a six-digit one-time
//! passcode delivered over email, and a `confirm` call consumes it. Codes
//! are purpose-scoped (`signup` vs `reset_password`), single-use, and
//! time-bounded; a new code for the same address invalidates the previous
//! one. The registry is process-local and forgets everything on restart.
//!
//! ## Sessions
//!
//! Sessions are HS256-signed tokens carrying `{sub, email, iat, exp}` with a
//! 24-hour expiry, handed to the client as an `HttpOnly` cookie. There is no
//! server-side session store; trust derives entirely from the signature, and
//! `check-auth` additionally requires the referenced account to still exist.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
