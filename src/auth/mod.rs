//! Authentication module for STASH.
//!
//! Password hashing and access token plumbing. The hosting core consumes
//! these as opaque collaborators: `hash_password`/`verify_password` for
//! credentials, `TokenIssuer` for identity tokens.

mod password;
mod token;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use token::{Claims, TokenError, TokenIssuer};

use thiserror::Error;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Username validation errors.
#[derive(Error, Debug)]
pub enum UsernameError {
    /// Username is outside the allowed length range.
    #[error("username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters")]
    InvalidLength,

    /// Username contains a disallowed character.
    #[error("username may only contain letters, digits, and underscores")]
    InvalidCharacter,
}

/// Validate a username: 3-32 characters, ASCII alphanumeric or underscore.
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(UsernameError::InvalidLength);
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(UsernameError::InvalidCharacter);
    }
    Ok(())
}
