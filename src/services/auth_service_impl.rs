//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::auth::password::{generate_reset_token, hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::config::AuthConfig;
use crate::db::Store;
use crate::entities::users::Role;
use crate::services::auth_service::{AuthError, AuthService, AuthSession, SessionPersistence};
use crate::services::mailer::Mailer;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    bcrypt_cost: u32,
    reset_token_ttl_minutes: i64,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            bcrypt_cost: config.bcrypt_cost,
            reset_token_ttl_minutes: config.reset_token_ttl_minutes,
        }
    }

    fn validate_email(email: &str) -> Result<(), AuthError> {
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }

    fn session_for(&self, user: crate::db::User) -> Result<AuthSession, AuthError> {
        let token = self.tokens.mint(user.id, user.role)?;
        let persistence = SessionPersistence::for_role(user.role);

        Ok(AuthSession {
            user,
            token,
            persistence,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        Self::validate_email(email)?;
        Self::validate_password(password)?;
        if name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        let user = self
            .store
            .create_user(email, name.trim(), &password_hash, Role::User)
            .await?;

        info!(user_id = user.id, "User registered");

        self.session_for(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some((user, password_hash)) =
            self.store.get_user_by_email_with_password(email).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        // Banned accounts cannot mint new tokens. Checked after the password
        // so the failure path does the same work either way.
        if user.is_banned {
            return Err(AuthError::AccountBanned);
        }

        self.session_for(user)
    }

    async fn me(&self, user_id: i32) -> Result<crate::db::User, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            // Same outcome as the success path: no account enumeration.
            return Ok(());
        };

        let token = generate_reset_token();
        let expires = chrono::Utc::now()
            + chrono::Duration::minutes(self.reset_token_ttl_minutes);

        self.store
            .set_reset_token(user.id, &token, &expires.to_rfc3339())
            .await?;

        self.mailer
            .send_password_reset(&user.email, &user.name, &token)
            .await
            .map_err(|e| AuthError::Internal(format!("Mailer error: {e}")))?;

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        Self::validate_password(new_password)?;

        if token.is_empty() {
            return Err(AuthError::InvalidResetToken);
        }

        let Some((user, expires)) = self.store.get_user_by_reset_token(token).await? else {
            return Err(AuthError::InvalidResetToken);
        };

        let expires = chrono::DateTime::parse_from_rfc3339(&expires)
            .map_err(|e| AuthError::Internal(format!("Malformed reset expiry: {e}")))?;

        if chrono::Utc::now() > expires {
            return Err(AuthError::ResetTokenExpired);
        }

        let new_hash = hash_password(new_password, self.bcrypt_cost).await?;

        self.store
            .clear_reset_and_set_password(user.id, &new_hash)
            .await?;

        info!(user_id = user.id, "Password reset completed");

        Ok(())
    }
}
