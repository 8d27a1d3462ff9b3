//! Password hashing and the registration password policy.
//!
//! Argon2id in PHC string format. Verification parses the stored hash,
//! so parameter upgrades only affect newly set passwords.

use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(
        "Password must be at least 8 characters and contain a digit, \
         a lowercase letter, an uppercase letter, and a special character."
    )]
    PolicyViolation,

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

/// Enforces the registration policy: length plus one character from
/// each of the digit, lowercase, uppercase, and special classes.
///
/// # Errors
///
/// Returns `PasswordError::PolicyViolation` when any class is missing.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_digit && has_lower && has_upper && has_special {
        Ok(())
    } else {
        Err(PasswordError::PolicyViolation)
    }
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::HashingFailed` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verifies a password against a stored PHC hash. An unparseable hash
/// verifies as false rather than erroring, so a corrupt row cannot be
/// logged in to.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_accepts_compliant_password() {
        assert!(validate_password("Durian#2024").is_ok());
    }

    #[test]
    fn policy_rejects_missing_classes() {
        assert!(validate_password("short1A!").is_ok());
        assert!(validate_password("alllowercase1!").is_err());
        assert!(validate_password("ALLUPPERCASE1!").is_err());
        assert!(validate_password("NoDigitsHere!").is_err());
        assert!(validate_password("NoSpecial123").is_err());
        assert!(validate_password("Ab1!").is_err());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("Durian#2024").unwrap();
        assert!(verify_password("Durian#2024", &hash));
        assert!(!verify_password("Durian#2025", &hash));
    }

    #[test]
    fn corrupt_hash_never_verifies() {
        assert!(!verify_password("Durian#2024", "not-a-phc-string"));
    }
}
