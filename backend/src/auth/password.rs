//! Password hashing using argon2
//!
//! Argon2 is CPU-bound; request handlers go through the `_async` variants,
//! which run on the blocking pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Password hashing service (Argon2id, default parameters)
pub struct PasswordService;

impl PasswordService {
    /// Hash a password into a PHC string
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Check a password against a stored PHC string
    ///
    /// A malformed stored hash is an error; a wrong password is `Ok(false)`.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))?
    }

    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_original_password() {
        let hash = PasswordService::hash("member-password-1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(PasswordService::verify("member-password-1", &hash).unwrap());
        assert!(!PasswordService::verify("member-password-2", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(PasswordService::verify("whatever", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let hash = PasswordService::hash_async("gym-rat-2024".to_string()).await.unwrap();
        assert!(PasswordService::verify_async("gym-rat-2024".to_string(), hash)
            .await
            .unwrap());
    }
}
