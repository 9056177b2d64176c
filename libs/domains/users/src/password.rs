use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use crate::error::{UserError, UserResult};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> UserResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` cannot be parsed.
    fn verify(&self, plain: &str, hash: &str) -> UserResult<bool>;
}

/// Argon2id with a random salt per hash, stored as a PHC string.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::Internal(format!("password hashing failed: {}", e)))
    }

    fn verify(&self, plain: &str, hash: &str) -> UserResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| UserError::Internal(format!("stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_differs_from_input_and_verifies() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("secret123", &hash).unwrap());
        assert!(!hasher.verify("secret124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("secret123").unwrap(), hasher.hash("secret123").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        let result = Argon2Hasher::new().verify("secret123", "not-a-phc-string");
        assert!(matches!(result, Err(UserError::Internal(_))));
    }
}
