//! Route handlers and the input validation they share.
//!
//! Validation runs before any store access; a request that fails a field
//! rule never touches the account directory.

pub mod current_user;
pub mod health;
pub mod login;
pub mod register;
pub mod root;


use axum::http::{HeaderMap, header::AUTHORIZATION};
use regex::Regex;

/// Username policy: 3+ chars of `[A-Za-z0-9_]`, no leading or trailing
/// underscore, no consecutive underscores.
pub fn valid_username(username: &str) -> bool {
    username.chars().count() >= 3
        && !username.starts_with('_')
        && !username.ends_with('_')
        && !username.contains("__")
        && Regex::new(r"^[A-Za-z0-9_]+$").is_ok_and(|re| re.is_match(username))
}

/// Lightweight email sanity check used before touching the store.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Registration password policy: 8+ chars with at least one uppercase
/// letter, one lowercase letter, one digit and one symbol.
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Pull the bearer token out of the `Authorization` header, if any.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}
