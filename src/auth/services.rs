use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes and validates an email, ready for lookup or storage.
pub fn checked_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    Ok(email)
}

pub fn check_username(username: &str) -> Result<(), AppError> {
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(AppError::BadRequest(format!(
            "Username must be between {} and {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
