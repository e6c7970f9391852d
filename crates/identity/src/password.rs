//! Password hashing and verification
//!
//! Passwords are hashed with bcrypt before storage and never kept in
//! plain text. Verification is constant-time within bcrypt itself.

use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password error types
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Password shorter than the accepted minimum
    #[error("Password must contain at least {min} characters")]
    TooShort {
        /// Minimum required length
        min: usize,
    },

    /// Bcrypt error
    #[error("Hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Result type for password operations
pub type Result<T> = std::result::Result<T, PasswordError>;

/// Check that a password meets the minimum length
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort { min: MIN_PASSWORD_LENGTH });
    }
    Ok(())
}

/// Hash a password for storage
///
/// # Errors
///
/// - `PasswordError::TooShort` - password below [`MIN_PASSWORD_LENGTH`]
/// - `PasswordError::Hashing` - bcrypt failure
pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;

    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}
