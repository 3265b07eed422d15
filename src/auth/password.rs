//! Password hashing and reset-token generation.

use anyhow::{Context, Result};
use tokio::task;

/// Hash a password with bcrypt at the given cost factor.
/// Note: This uses `spawn_blocking` because bcrypt is CPU-intensive and
/// would block the async runtime if run directly.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        bcrypt::hash(&password, cost).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
    })
    .await
    .context("Password hashing task panicked")?
}

/// Verify a password against a stored bcrypt hash.
/// A malformed hash counts as a failed verification rather than an error so
/// callers cannot distinguish it from a wrong password.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .context("Password verification task panicked")
}

/// Generate a random password-reset token (64 character hex string)
#[must_use]
pub fn generate_reset_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        // Minimum cost keeps the test fast
        let hash = hash_password("hunter22", 4).await.unwrap();

        assert!(verify_password("hunter22", &hash).await.unwrap());
        assert!(!verify_password("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }
}
