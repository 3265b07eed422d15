use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::users::Role;
use crate::entities::{articles, categories, resources};
use crate::services::SessionPersistence;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public user record. Never carries the password hash or reset fields.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_banned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_banned: user.is_banned,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Admin listing row: the user plus community activity counts.
#[derive(Debug, Serialize)]
pub struct UserSummaryDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub question_count: i64,
    pub answer_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub user: UserDto,
    pub token: String,
    pub persistence: SessionPersistence,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Post author as shown to clients: either a registered user or a guest.
#[derive(Debug, Serialize)]
pub struct AuthorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: AuthorDto,
    pub created_at: String,
    pub answers: Vec<AnswerDto>,
}

#[derive(Debug, Serialize)]
pub struct AnswerDto {
    pub id: i32,
    pub question_id: i32,
    pub content: String,
    pub author: AuthorDto,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleDto {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category_id: i32,
    pub published_at: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct ResourceDto {
    pub id: i32,
    pub title: String,
    pub url: String,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<articles::Model> for ArticleDto {
    fn from(m: articles::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            summary: m.summary,
            content: m.content,
            category_id: m.category_id,
            published_at: m.published_at,
        }
    }
}

impl From<categories::Model> for CategoryDto {
    fn from(m: categories::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

impl From<resources::Model> for ResourceDto {
    fn from(m: resources::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            url: m.url,
            kind: m.kind,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub db_ready: bool,
    pub total_users: u64,
    pub total_questions: u64,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub ban: bool,
}
