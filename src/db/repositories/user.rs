use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;

use crate::entities::users::{self, Role};
use crate::entities::{answers, questions};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_banned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            is_banned: model.is_banned,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a user. The caller supplies an already-hashed password.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role),
            is_banned: Set(false),
            reset_token: Set(None),
            reset_token_expires: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Get user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email with password hash (for credential verification)
    pub async fn get_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get several users at once, for resolving post authors.
    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query users by ids")?;

        Ok(models.into_iter().map(User::from).collect())
    }

    /// All users, newest first. No pagination; the admin surface is small.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(models.into_iter().map(User::from).collect())
    }

    /// Store a password-reset token and its expiry on a user.
    /// Both fields are set together; `clear_reset_and_set_password` clears
    /// them together.
    pub async fn set_reset_token(&self, id: i32, token: &str, expires: &str) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for reset token")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.reset_token = Set(Some(token.to_string()));
        active.reset_token_expires = Set(Some(expires.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Look up the user holding a reset token, returning its stored expiry.
    pub async fn get_by_reset_token(&self, token: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::ResetToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by reset token")?;

        Ok(user.and_then(|u| {
            let expires = u.reset_token_expires.clone()?;
            Some((User::from(u), expires))
        }))
    }

    /// Store a new password hash and clear both reset-token fields.
    pub async fn clear_reset_and_set_password(&self, id: i32, new_hash: &str) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password reset")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash.to_string());
        active.reset_token = Set(None);
        active.reset_token_expires = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Set the ban flag. Idempotent: re-applying the current value is a
    /// successful no-op. Returns None for unknown ids.
    pub async fn set_banned(&self, id: i32, banned: bool) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for ban update")?
        else {
            return Ok(None);
        };

        if user.is_banned == banned {
            return Ok(Some(User::from(user)));
        }

        let mut active: users::ActiveModel = user.into();
        active.is_banned = Set(banned);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        Ok(Some(User::from(updated)))
    }

    /// Change a user's role. Returns None for unknown ids.
    pub async fn set_role(&self, id: i32, role: Role) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for role update")?
        else {
            return Ok(None);
        };

        if user.role == role {
            return Ok(Some(User::from(user)));
        }

        let mut active: users::ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await?;

        Ok(Some(User::from(updated)))
    }

    /// Question counts per author, for the admin user listing.
    pub async fn question_counts(&self) -> Result<HashMap<i32, i64>> {
        let rows: Vec<(Option<i32>, i64)> = questions::Entity::find()
            .select_only()
            .column(questions::Column::UserId)
            .column_as(questions::Column::Id.count(), "count")
            .group_by(questions::Column::UserId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count questions per user")?;

        Ok(rows
            .into_iter()
            .filter_map(|(user_id, count)| user_id.map(|id| (id, count)))
            .collect())
    }

    /// Answer counts per author, for the admin user listing.
    pub async fn answer_counts(&self) -> Result<HashMap<i32, i64>> {
        let rows: Vec<(Option<i32>, i64)> = answers::Entity::find()
            .select_only()
            .column(answers::Column::UserId)
            .column_as(answers::Column::Id.count(), "count")
            .group_by(answers::Column::UserId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count answers per user")?;

        Ok(rows
            .into_iter()
            .filter_map(|(user_id, count)| user_id.map(|id| (id, count)))
            .collect())
    }

    pub async fn count_users(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }
}
