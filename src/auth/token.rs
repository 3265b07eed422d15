//! Bearer-token minting and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and a role snapshot taken at
//! issuance. Validity is decided by signature and expiry alone; there is no
//! server-side revocation list.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entities::users::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,

    /// Role at issuance time. Stale after promotion/ban until re-login.
    pub role: Role,

    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// Signing and verification keys, built once at startup from the configured
/// secret and shared read-only across handlers.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn mint(&self, user_id: i32, role: Role) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .context("Invalid expiry timestamp")?
            .timestamp();

        let claims = Claims {
            sub: user_id,
            role,
            exp: usize::try_from(expiration).context("Expiry before unix epoch")?,
        };

        encode(&Header::default(), &claims, &self.encoding).context("Failed to sign token")
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(token, &self.decoding, &Validation::default())
            .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}
