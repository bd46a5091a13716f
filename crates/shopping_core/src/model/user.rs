//! User accounts, login sessions and API clients.
//!
//! # Invariants
//! - `username` is unique and matches `[A-Za-z0-9.@+_-]{1,150}`.
//! - Password material is only ever held as a salted hash.
//! - A user owns at most one API client.

use super::validation::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;

pub type UserId = i64;

pub const USERNAME_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const NAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.@+_-]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Persisted account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    /// Epoch milliseconds.
    pub date_joined: i64,
}

/// Insert payload for a new account. `password_hash` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        if self.first_name.chars().count() > NAME_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "first_name",
                max_chars: NAME_MAX_CHARS,
            });
        }
        if self.last_name.chars().count() > NAME_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "last_name",
                max_chars: NAME_MAX_CHARS,
            });
        }
        Ok(())
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    require_text("username", username, USERNAME_MAX_CHARS)?;
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require_text("email", email, EMAIL_MAX_CHARS)?;
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Server-side login session bound to a browser cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_key: String,
    pub user_id: UserId,
    pub created_at: i64,
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// Programmatic access credential owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    pub id: i64,
    pub name: String,
    pub user_id: UserId,
    pub is_active: bool,
    /// Hash of the secret handed out once at enable time.
    pub client_secret: String,
}

/// Display name given to a user's client.
pub fn client_name_for(username: &str) -> String {
    format!("{username}'s API Client")
}
