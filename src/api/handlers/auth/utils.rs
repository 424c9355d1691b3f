//! Field validation helpers shared by the auth handlers.

use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Mobile numbers are stored as a bare 10-digit string.
pub(crate) fn valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 3
}

pub(crate) fn valid_password(password: &str) -> bool {
    password.chars().count() >= 5
}

/// Submitted passcodes must be exactly six digits.
pub(crate) fn valid_otp(otp: &str) -> bool {
    otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit())
}
