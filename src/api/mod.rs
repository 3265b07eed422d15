use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod content;
mod error;
mod observability;
mod questions;
pub mod rbac;
mod types;

pub use error::ApiError;
pub use rbac::AuthContext;
pub use types::*;

use tokio::sync::RwLock;

use crate::auth::TokenService;
use crate::services::AuthService;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.shared.tokens
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    // Credential and listing endpoints, no token required
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/articles", get(content::list_articles))
        .route("/categories", get(content::list_categories))
        .route("/resources", get(content::list_resources))
        .route("/questions", get(questions::list_questions))
        .route("/questions/search", get(questions::search_questions));

    // Community writes accept either a bearer token or a guest identity
    let community_routes = Router::new()
        .route("/questions", post(questions::create_question))
        .route("/answers", post(questions::create_answer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rbac::optional_auth,
        ));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/questions/{id}", delete(questions::delete_question))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rbac::require_auth,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", get(admin::get_user_detail))
        .route("/users/{id}/ban", post(admin::ban_user))
        .route("/users/{id}/promote", post(admin::promote_user))
        .route("/status", get(admin::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rbac::require_admin,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(community_routes)
        .merge(protected_routes)
        .nest("/admin", admin_routes)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}
