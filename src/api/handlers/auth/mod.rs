//! Authentication flows: OTP-gated signup, login, password reset, and
//! stateless session validation.

pub(crate) mod error;
pub mod login;
pub(crate) mod otp;
pub(crate) mod password;
pub mod reset;
pub mod session;
pub mod signup;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub(crate) mod utils;

#[cfg(test)]
mod test_support;

pub use state::{AuthConfig, AuthState};
