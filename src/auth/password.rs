//! Password hashing and verification.
//!
//! Argon2id with a per-password random salt, stored as a PHC string
//! (`$argon2id$v=19$...`). Hashing is deliberately CPU-expensive; it runs
//! without holding any shared lock.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// One-way hash of a plaintext password.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| HashError::Hashing(e.to_string()))
}

/// Verify a plaintext against a stored hash.
///
/// Returns false on any mismatch, including a malformed stored hash; a bad
/// hash in the store is an authentication failure, not a server fault.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash("Secret#123").unwrap();
        assert!(verify("Secret#123", &hashed));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hashed = hash("Secret#123").unwrap();
        assert!(!verify("secret#123", &hashed));
        assert!(!verify("", &hashed));
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verify("Secret#123", "not-a-phc-string"));
        assert!(!verify("Secret#123", ""));
    }

    #[test]
    fn same_password_hashes_to_distinct_strings() {
        let a = hash("Secret#123").unwrap();
        let b = hash("Secret#123").unwrap();
        // Random salts; equality would mean salt reuse
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_a_phc_string() {
        let hashed = hash("Secret#123").unwrap();
        assert!(hashed.starts_with("$argon2id$"));
    }
}
