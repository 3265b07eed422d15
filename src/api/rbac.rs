//! Role-based access control for the HTTP surface.
//!
//! Every request passes one of these layers and ends up with an
//! [`AuthContext`] in its extensions: either `Anonymous` or
//! `Authenticated` with the id and role carried by the bearer token.
//! Handlers read the tagged variant instead of re-checking header state.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::entities::users::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated { user_id: i32, role: Role },
}

impl AuthContext {
    #[must_use]
    pub const fn user_id(self) -> Option<i32> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                role: Role::Admin,
                ..
            }
        )
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = state
        .tokens()
        .verify(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(AuthContext::Authenticated {
        user_id: claims.sub,
        role: claims.role,
    })
}

/// Protected routes: a valid bearer token is mandatory.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(&state, req.headers())?;

    if let Some(user_id) = ctx.user_id() {
        tracing::Span::current().record("user_id", user_id);
    }

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Optional-auth routes: a missing or invalid token downgrades to anonymous
/// instead of failing the request.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = authenticate(&state, req.headers()).unwrap_or(AuthContext::Anonymous);

    if let Some(user_id) = ctx.user_id() {
        tracing::Span::current().record("user_id", user_id);
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Admin routes: valid token and role `admin`, otherwise 401/403.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(&state, req.headers())?;

    if !ctx.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    if let Some(user_id) = ctx.user_id() {
        tracing::Span::current().record("user_id", user_id);
    }

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def".to_string()));

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_context_role_queries() {
        let admin = AuthContext::Authenticated {
            user_id: 1,
            role: Role::Admin,
        };
        let user = AuthContext::Authenticated {
            user_id: 2,
            role: Role::User,
        };

        assert!(admin.is_admin());
        assert!(!user.is_admin());
        assert!(!AuthContext::Anonymous.is_admin());
        assert_eq!(AuthContext::Anonymous.user_id(), None);
        assert_eq!(user.user_id(), Some(2));
    }
}
