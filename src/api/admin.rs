use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::questions::{answer_dtos, question_dtos};
use super::types::{AnswerDto, BanRequest, QuestionDto, SystemStatus, UserDto, UserSummaryDto};
use super::{ApiError, ApiResponse, AppState};
use crate::entities::users::Role;

#[derive(Debug, serde::Serialize)]
pub struct UserDetailDto {
    pub user: UserDto,
    pub questions: Vec<QuestionDto>,
    pub answers: Vec<AnswerDto>,
}

/// GET /admin/users
/// All users with their community activity counts
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserSummaryDto>>>, ApiError> {
    let users = state.store().list_users().await?;
    let question_counts = state.store().user_question_counts().await?;
    let answer_counts = state.store().user_answer_counts().await?;

    let summaries = users
        .into_iter()
        .map(|user| {
            let question_count = question_counts.get(&user.id).copied().unwrap_or(0);
            let answer_count = answer_counts.get(&user.id).copied().unwrap_or(0);
            UserSummaryDto {
                user: UserDto::from(user),
                question_count,
                answer_count,
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(summaries)))
}

/// GET /admin/users/{id}
/// One user with their full question and answer lists
pub async fn get_user_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDetailDto>>, ApiError> {
    let user = state
        .store()
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let questions = state.store().questions_for_user(id).await?;
    let answers = state.store().answers_for_user(id).await?;

    let questions = question_dtos(&state, questions).await?;
    let answers = answer_dtos(&state, answers).await?;

    Ok(Json(ApiResponse::success(UserDetailDto {
        user: UserDto::from(user),
        questions,
        answers,
    })))
}

/// POST /admin/users/{id}/ban
/// Flip the ban flag. Idempotent; admins cannot be banned.
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<BanRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let target = state
        .store()
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    // Checked before any mutation so a rejected request leaves no trace.
    if payload.ban && target.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot be banned"));
    }

    let updated = state
        .store()
        .set_user_banned(id, payload.ban)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = id, banned = payload.ban, "Ban flag updated");

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// POST /admin/users/{id}/promote
/// Grant the admin role. Idempotent.
pub async fn promote_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let updated = state
        .store()
        .set_user_role(id, Role::Admin)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;

    tracing::info!(user_id = id, "User promoted to admin");

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// GET /admin/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let db_ready = state.store().ping().await.is_ok();
    let total_users = state.store().count_users().await?;
    let total_questions = state.store().count_questions().await?;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        db_ready,
        total_users,
        total_questions,
    })))
}
