use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::users::Role;
use crate::entities::{answers, articles, categories, questions, resources};

pub mod migrator;
pub mod repositories;

pub use repositories::question::Authorship;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn question_repo(&self) -> repositories::question::QuestionRepository {
        repositories::question::QuestionRepository::new(self.conn.clone())
    }

    fn content_repo(&self) -> repositories::content::ContentRepository {
        repositories::content::ContentRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        self.user_repo()
            .create(email, name, password_hash, role)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn set_reset_token(&self, user_id: i32, token: &str, expires: &str) -> Result<()> {
        self.user_repo().set_reset_token(user_id, token, expires).await
    }

    pub async fn get_user_by_reset_token(&self, token: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_reset_token(token).await
    }

    pub async fn clear_reset_and_set_password(&self, user_id: i32, new_hash: &str) -> Result<()> {
        self.user_repo()
            .clear_reset_and_set_password(user_id, new_hash)
            .await
    }

    pub async fn set_user_banned(&self, user_id: i32, banned: bool) -> Result<Option<User>> {
        self.user_repo().set_banned(user_id, banned).await
    }

    pub async fn set_user_role(&self, user_id: i32, role: Role) -> Result<Option<User>> {
        self.user_repo().set_role(user_id, role).await
    }

    pub async fn user_question_counts(&self) -> Result<HashMap<i32, i64>> {
        self.user_repo().question_counts().await
    }

    pub async fn user_answer_counts(&self) -> Result<HashMap<i32, i64>> {
        self.user_repo().answer_counts().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count_users().await
    }

    // ========== Community board ==========

    pub async fn create_question(
        &self,
        title: &str,
        content: &str,
        author: Authorship,
    ) -> Result<questions::Model> {
        self.question_repo().create(title, content, author).await
    }

    pub async fn get_question(&self, id: i32) -> Result<Option<questions::Model>> {
        self.question_repo().get(id).await
    }

    pub async fn list_questions(&self) -> Result<Vec<questions::Model>> {
        self.question_repo().list_newest().await
    }

    pub async fn search_questions(&self, query: &str) -> Result<Vec<questions::Model>> {
        self.question_repo().search(query).await
    }

    pub async fn questions_for_user(&self, user_id: i32) -> Result<Vec<questions::Model>> {
        self.question_repo().list_for_user(user_id).await
    }

    pub async fn delete_question(&self, id: i32) -> Result<bool> {
        self.question_repo().delete(id).await
    }

    pub async fn create_answer(
        &self,
        question_id: i32,
        content: &str,
        author: Authorship,
    ) -> Result<answers::Model> {
        self.question_repo()
            .create_answer(question_id, content, author)
            .await
    }

    pub async fn answers_for_questions(
        &self,
        question_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<answers::Model>>> {
        self.question_repo()
            .answers_for_questions(question_ids)
            .await
    }

    pub async fn answers_for_user(&self, user_id: i32) -> Result<Vec<answers::Model>> {
        self.question_repo().answers_for_user(user_id).await
    }

    pub async fn count_questions(&self) -> Result<u64> {
        self.question_repo().count_questions().await
    }

    // ========== Content ==========

    pub async fn list_articles(&self) -> Result<Vec<articles::Model>> {
        self.content_repo().list_articles().await
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.content_repo().list_categories().await
    }

    pub async fn list_resources(&self) -> Result<Vec<resources::Model>> {
        self.content_repo().list_resources().await
    }
}
