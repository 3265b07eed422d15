//! Domain service for identity verification and bearer-token issuance.
//!
//! Handles registration, login, the current-user lookup, and the
//! forgot/reset password flow.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::entities::users::Role;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A ban blocks new token issuance. Mapped to the same client-visible
    /// response as bad credentials so account state cannot be probed.
    #[error("Account is banned")]
    AccountBanned,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Reset token expired")]
    ResetTokenExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Client-side storage scope for the issued token. Decided once at issuance
/// from the role; a usability choice, not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPersistence {
    /// Long-lived storage (admin accounts).
    Durable,
    /// Session-scoped storage (regular accounts).
    Ephemeral,
}

impl SessionPersistence {
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::Durable,
            Role::User => Self::Ephemeral,
        }
    }
}

/// Successful login/registration: the public user record, a freshly minted
/// bearer token, and the storage policy for it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub persistence: SessionPersistence,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user with role `user` and returns a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] for duplicate emails and
    /// [`AuthError::Validation`] for malformed input.
    async fn register(&self, email: &str, name: &str, password: &str)
    -> Result<AuthSession, AuthError>;

    /// Verifies credentials and returns a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on unknown email or wrong
    /// password, [`AuthError::AccountBanned`] for banned accounts.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Re-fetches the current user record, so role and ban changes made
    /// after token issuance are visible.
    async fn me(&self, user_id: i32) -> Result<User, AuthError>;

    /// Stores a single-use reset token and hands it to the mailer. Succeeds
    /// regardless of whether the email exists (anti-enumeration).
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Consumes a reset token and stores a new password hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidResetToken`] for unknown tokens and
    /// [`AuthError::ResetTokenExpired`] past the expiry window.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}
