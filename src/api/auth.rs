use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::rbac::AuthContext;
use super::types::{MessageResponse, SessionDto, UserDto};
use super::{ApiError, ApiResponse, AppState};
use crate::services::AuthSession;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

fn session_dto(session: AuthSession) -> SessionDto {
    SessionDto {
        user: UserDto::from(session.user),
        token: session.token,
        persistence: session.persistence,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account with role `user` and return a fresh session
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionDto>>), ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let session = state
        .auth_service()
        .register(&payload.email, &payload.name, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(session_dto(session))),
    ))
}

/// POST /auth/login
/// Verify credentials, returns a token plus the public user record
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let session = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(session_dto(session))))
}

/// GET /auth/me
/// Current user, re-fetched from the database so role and ban changes made
/// after the token was issued are visible (requires authentication)
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user_id = ctx
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state.auth_service().me(user_id).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/forgot-password
/// Always answers with the same generic message, whether or not the email
/// matches an account
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state.auth_service().forgot_password(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "If that email is registered, a reset link has been sent".to_string(),
    })))
}

/// POST /auth/reset-password
/// Consume a reset token and store a new password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
