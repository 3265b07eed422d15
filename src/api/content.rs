use axum::{Json, extract::State};
use std::sync::Arc;

use super::types::{ArticleDto, CategoryDto, ResourceDto};
use super::{ApiError, ApiResponse, AppState};

/// GET /articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ArticleDto>>>, ApiError> {
    let articles = state
        .store()
        .list_articles()
        .await?
        .into_iter()
        .map(ArticleDto::from)
        .collect();

    Ok(Json(ApiResponse::success(articles)))
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state
        .store()
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryDto::from)
        .collect();

    Ok(Json(ApiResponse::success(categories)))
}

/// GET /resources
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ResourceDto>>>, ApiError> {
    let resources = state
        .store()
        .list_resources()
        .await?
        .into_iter()
        .map(ResourceDto::from)
        .collect();

    Ok(Json(ApiResponse::success(resources)))
}
