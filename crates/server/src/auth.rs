//! Password hashing helpers (argon2id).
//!
//! Hashing and verification happen only here, at the HTTP boundary; the
//! engine stores and returns opaque hash strings.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::ServerError;

pub(crate) fn hash_password(password: &str) -> Result<String, ServerError> {
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes())
        .map_err(|_| ServerError::Generic("failed to hash password".to_string()))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "hunter2"));
    }
}
