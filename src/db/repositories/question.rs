use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

use crate::entities::{answers, questions};

/// Authorship of a community post: a resolved user id, or a free-text
/// guest identity for anonymous submitters.
#[derive(Debug, Clone)]
pub enum Authorship {
    User(i32),
    Guest { name: String, email: String },
}

impl Authorship {
    fn into_columns(self) -> (Option<i32>, Option<String>, Option<String>) {
        match self {
            Self::User(id) => (Some(id), None, None),
            Self::Guest { name, email } => (None, Some(name), Some(email)),
        }
    }
}

pub struct QuestionRepository {
    conn: DatabaseConnection,
}

impl QuestionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        title: &str,
        content: &str,
        author: Authorship,
    ) -> Result<questions::Model> {
        let (user_id, guest_name, guest_email) = author.into_columns();

        let active = questions::ActiveModel {
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            user_id: Set(user_id),
            guest_name: Set(guest_name),
            guest_email: Set(guest_email),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert question")
    }

    pub async fn get(&self, id: i32) -> Result<Option<questions::Model>> {
        questions::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query question")
    }

    /// All questions, newest first.
    pub async fn list_newest(&self) -> Result<Vec<questions::Model>> {
        questions::Entity::find()
            .order_by_desc(questions::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list questions")
    }

    /// Substring search over title and content.
    pub async fn search(&self, query: &str) -> Result<Vec<questions::Model>> {
        questions::Entity::find()
            .filter(
                Condition::any()
                    .add(questions::Column::Title.contains(query))
                    .add(questions::Column::Content.contains(query)),
            )
            .order_by_desc(questions::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to search questions")
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<questions::Model>> {
        questions::Entity::find()
            .filter(questions::Column::UserId.eq(user_id))
            .order_by_desc(questions::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list questions for user")
    }

    /// Delete a question and its answers. Returns false for unknown ids.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let Some(question) = self.get(id).await? else {
            return Ok(false);
        };

        answers::Entity::delete_many()
            .filter(answers::Column::QuestionId.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to delete answers for question")?;

        question
            .delete(&self.conn)
            .await
            .context("Failed to delete question")?;

        Ok(true)
    }

    pub async fn create_answer(
        &self,
        question_id: i32,
        content: &str,
        author: Authorship,
    ) -> Result<answers::Model> {
        let (user_id, guest_name, guest_email) = author.into_columns();

        let active = answers::ActiveModel {
            question_id: Set(question_id),
            content: Set(content.to_string()),
            user_id: Set(user_id),
            guest_name: Set(guest_name),
            guest_email: Set(guest_email),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert answer")
    }

    /// Answers for a set of questions, grouped by question id.
    pub async fn answers_for_questions(
        &self,
        question_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<answers::Model>>> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = answers::Entity::find()
            .filter(answers::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(answers::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query answers")?;

        let mut grouped: HashMap<i32, Vec<answers::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.question_id).or_default().push(row);
        }

        Ok(grouped)
    }

    pub async fn answers_for_user(&self, user_id: i32) -> Result<Vec<answers::Model>> {
        answers::Entity::find()
            .filter(answers::Column::UserId.eq(user_id))
            .order_by_desc(answers::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list answers for user")
    }

    pub async fn count_questions(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        questions::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count questions")
    }
}
