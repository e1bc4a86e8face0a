//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::domain::user::truncate_password;
use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

const MEMORY_COST_KIB: u32 = 19_456;
const DEFAULT_TIME_COST: u32 = 3;

/// Argon2id hasher with a configurable iteration count
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::new(MEMORY_COST_KIB, DEFAULT_TIME_COST, 1, None)
                .unwrap_or_default(),
        }
    }

    /// Create a hasher with the given iteration count (`t_cost`)
    pub fn with_cost(time_cost: u32) -> Result<Self, DomainError> {
        let params = Params::new(MEMORY_COST_KIB, time_cost, 1, None).map_err(|e| {
            DomainError::configuration(format!("Invalid password hash cost: {}", e))
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(truncate_password(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Parameters are read from the PHC string, so hashes made with an
        // older cost still verify.
        self.argon2()
            .verify_password(truncate_password(password).as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secret123", &hash));
        assert!(!hasher.verify("Secret124", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let hash1 = hasher.hash("Secret123").unwrap();
        let hash2 = hasher.hash("Secret123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("Secret123", &hash1));
        assert!(hasher.verify("Secret123", &hash2));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_long_passwords_are_truncated() {
        let hasher = fast_hasher();
        let base = "A1".repeat(36);
        let hash = hasher.hash(&format!("{}tail", base)).unwrap();

        assert!(hasher.verify(&base, &hash));
        assert!(hasher.verify(&format!("{}other", base), &hash));
    }

    #[test]
    fn test_zero_cost_is_rejected() {
        assert!(matches!(
            Argon2Hasher::with_cost(0),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_hash_from_other_cost_verifies() {
        let hash = Argon2Hasher::with_cost(2).unwrap().hash("Secret123").unwrap();
        assert!(fast_hasher().verify("Secret123", &hash));
    }
}
