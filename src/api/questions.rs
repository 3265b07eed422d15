use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::rbac::AuthContext;
use super::types::{AnswerDto, AuthorDto, QuestionDto};
use super::{ApiError, ApiResponse, AppState};
use crate::db::Authorship;
use crate::entities::{answers, questions};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAnswerRequest {
    pub question_id: i32,
    pub content: String,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ============================================================================
// DTO assembly
// ============================================================================

fn author_dto(
    user_id: Option<i32>,
    guest_name: Option<String>,
    names: &HashMap<i32, String>,
) -> AuthorDto {
    match user_id {
        Some(id) => AuthorDto {
            user_id: Some(id),
            name: names.get(&id).cloned().unwrap_or_else(|| "Unknown".to_string()),
        },
        None => AuthorDto {
            user_id: None,
            name: guest_name.unwrap_or_else(|| "Guest".to_string()),
        },
    }
}

async fn author_names(
    state: &AppState,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, String>, ApiError> {
    let mut user_ids = user_ids;
    user_ids.sort_unstable();
    user_ids.dedup();

    let names = state
        .store()
        .get_users_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    Ok(names)
}

/// Assemble question DTOs with their answers and resolved author names.
pub(super) async fn question_dtos(
    state: &AppState,
    questions: Vec<questions::Model>,
) -> Result<Vec<QuestionDto>, ApiError> {
    let question_ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
    let mut answers_by_question = state.store().answers_for_questions(&question_ids).await?;

    let user_ids: Vec<i32> = questions
        .iter()
        .filter_map(|q| q.user_id)
        .chain(
            answers_by_question
                .values()
                .flatten()
                .filter_map(|a| a.user_id),
        )
        .collect();
    let names = author_names(state, user_ids).await?;

    let dtos = questions
        .into_iter()
        .map(|q| {
            let answers = answers_by_question
                .remove(&q.id)
                .unwrap_or_default()
                .into_iter()
                .map(|a| AnswerDto {
                    id: a.id,
                    question_id: a.question_id,
                    author: author_dto(a.user_id, a.guest_name, &names),
                    content: a.content,
                    created_at: a.created_at,
                })
                .collect();

            QuestionDto {
                id: q.id,
                author: author_dto(q.user_id, q.guest_name, &names),
                title: q.title,
                content: q.content,
                created_at: q.created_at,
                answers,
            }
        })
        .collect();

    Ok(dtos)
}

pub(super) async fn answer_dtos(
    state: &AppState,
    answers: Vec<answers::Model>,
) -> Result<Vec<AnswerDto>, ApiError> {
    let user_ids: Vec<i32> = answers.iter().filter_map(|a| a.user_id).collect();
    let names = author_names(state, user_ids).await?;

    Ok(answers
        .into_iter()
        .map(|a| AnswerDto {
            id: a.id,
            question_id: a.question_id,
            author: author_dto(a.user_id, a.guest_name, &names),
            content: a.content,
            created_at: a.created_at,
        })
        .collect())
}

/// Resolve who is posting. Authenticated callers are re-read from the store
/// so a ban applied after token issuance still blocks the write; anonymous
/// callers must supply a guest identity.
async fn resolve_authorship(
    state: &AppState,
    ctx: AuthContext,
    guest_name: Option<String>,
    guest_email: Option<String>,
) -> Result<Authorship, ApiError> {
    match ctx.user_id() {
        Some(user_id) => {
            let user = state
                .store()
                .get_user_by_id(user_id)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

            if user.is_banned {
                return Err(ApiError::forbidden("Account is banned"));
            }

            Ok(Authorship::User(user.id))
        }
        None => {
            let name = guest_name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| ApiError::validation("Guest name is required"))?;
            let email = guest_email
                .filter(|e| e.contains('@'))
                .ok_or_else(|| ApiError::validation("A valid guest email is required"))?;

            Ok(Authorship::Guest { name, email })
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /questions
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<QuestionDto>>>, ApiError> {
    let questions = state.store().list_questions().await?;
    let dtos = question_dtos(&state, questions).await?;

    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /questions/search?q=
pub async fn search_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<QuestionDto>>>, ApiError> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation("Search query is required"))?;

    let questions = state.store().search_questions(q).await?;
    let dtos = question_dtos(&state, questions).await?;

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /questions
/// Optional auth: logged-in callers post under their account, anonymous
/// callers must supply a guest name and email
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuestionDto>>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    let author = resolve_authorship(&state, ctx, payload.guest_name, payload.guest_email).await?;

    let question = state
        .store()
        .create_question(payload.title.trim(), &payload.content, author)
        .await?;

    let mut dtos = question_dtos(&state, vec![question]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| ApiError::internal("Created question vanished"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// DELETE /questions/{id}
/// Owner or admin only (requires authentication)
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let question = state
        .store()
        .get_question(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Question", id))?;

    let is_owner = ctx.user_id().is_some() && question.user_id == ctx.user_id();
    if !ctx.is_admin() && !is_owner {
        return Err(ApiError::forbidden("Only the question owner or an admin may delete"));
    }

    // Re-read the caller: a ban applied after token issuance revokes
    // owner deletes (admins cannot be banned).
    if !ctx.is_admin()
        && let Some(user_id) = ctx.user_id()
    {
        let user = state
            .store()
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;
        if user.is_banned {
            return Err(ApiError::forbidden("Account is banned"));
        }
    }

    state.store().delete_question(id).await?;

    tracing::info!(question_id = id, "Question deleted");

    Ok(Json(ApiResponse::success(())))
}

/// POST /answers
/// Optional auth, same guest rules as questions
pub async fn create_answer(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateAnswerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AnswerDto>>), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    state
        .store()
        .get_question(payload.question_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Question", payload.question_id))?;

    let author = resolve_authorship(&state, ctx, payload.guest_name, payload.guest_email).await?;

    let answer = state
        .store()
        .create_answer(payload.question_id, &payload.content, author)
        .await?;

    let mut dtos = answer_dtos(&state, vec![answer]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| ApiError::internal("Created answer vanished"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}
