use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use greenledger::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.auth.bcrypt_cost = 4;

    let state = greenledger::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    greenledger::api::router(state).await
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_authed(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Login as the migration-seeded admin account.
async fn admin_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "admin@greenledger.local", "password": "password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Register a regular user, returning (user_id, token).
async fn register_user(app: &Router, email: &str) -> (i64, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "email": email, "name": "Member", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    (
        body["data"]["user"]["id"].as_i64().unwrap(),
        body["data"]["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_admin_routes_reject_anonymous_and_non_admin() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, user_token) = register_user(&app, "member@example.com").await;
    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/users", &user_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_includes_activity_counts() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let (_, user_token) = register_user(&app, "member@example.com").await;
    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &user_token,
            serde_json::json!({ "title": "Scope 3 reporting", "content": "Where do I start?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["data"].as_array().unwrap();
    let member = users
        .iter()
        .find(|u| u["email"] == "member@example.com")
        .unwrap();
    assert_eq!(member["question_count"], 1);
    assert_eq!(member["answer_count"], 0);
}

#[tokio::test]
async fn test_user_detail_includes_posts_and_404s_unknown() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let (user_id, user_token) = register_user(&app, "member@example.com").await;
    app.clone()
        .oneshot(post_authed(
            "/api/questions",
            &user_token,
            serde_json::json!({ "title": "Emission factors", "content": "Which database?" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_authed(&format!("/api/admin/users/{user_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["email"], "member@example.com");
    assert_eq!(body["data"]["questions"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["answers"].as_array().unwrap().len(), 0);

    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/users/99999", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ban_flow() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let (user_id, user_token) = register_user(&app, "member@example.com").await;

    // Ban
    let response = app
        .clone()
        .oneshot(post_authed(
            &format!("/api/admin/users/{user_id}/ban"),
            &token,
            serde_json::json!({ "ban": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_banned"], true);

    // Banning again is idempotent
    let response = app
        .clone()
        .oneshot(post_authed(
            &format!("/api/admin/users/{user_id}/ban"),
            &token,
            serde_json::json!({ "ban": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_banned"], true);

    // The old token still resolves `me`, which shows the ban
    let response = app
        .clone()
        .oneshot(get_authed("/api/auth/me", &user_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_banned"], true);

    // But a fresh login is refused
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "member@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unban restores login
    let response = app
        .clone()
        .oneshot(post_authed(
            &format!("/api/admin/users/{user_id}/ban"),
            &token,
            serde_json::json!({ "ban": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "member@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_accounts_cannot_be_banned() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    // Seeded admin is id 1
    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/admin/users/1/ban",
            &token,
            serde_json::json!({ "ban": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/users/1", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["is_banned"], false);
}

#[tokio::test]
async fn test_ban_unknown_user_404s() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/admin/users/99999/ban",
            &token,
            serde_json::json!({ "ban": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_promote_grants_admin_access() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let (user_id, _) = register_user(&app, "member@example.com").await;

    let response = app
        .clone()
        .oneshot(post_authed(
            &format!("/api/admin/users/{user_id}/promote"),
            &token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "admin");

    // Role is read from the token, so admin access needs a fresh login
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "member@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let new_token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["persistence"], "durable");

    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/users", &new_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_reports_totals() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    register_user(&app, "member@example.com").await;

    let response = app
        .clone()
        .oneshot(get_authed("/api/admin/status", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_users"], 2);
    assert_eq!(body["data"]["db_ready"], true);
    assert!(body["data"]["version"].is_string());
}
