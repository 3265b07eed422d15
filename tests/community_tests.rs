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

async fn register_user(app: &Router, email: &str, name: &str) -> (i64, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({ "email": email, "name": name, "password": "hunter2hunter2" }),
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

async fn admin_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "admin@greenledger.local", "password": "password" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_guest_question_requires_identity() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/questions",
            serde_json::json!({ "title": "CSRD timeline", "content": "When does it apply?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/questions",
            serde_json::json!({
                "title": "CSRD timeline",
                "content": "When does it apply?",
                "guest_name": "Visitor",
                "guest_email": "not-an-email"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guest_can_post_with_identity() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/questions",
            serde_json::json!({
                "title": "CSRD timeline",
                "content": "When does it apply to mid-caps?",
                "guest_name": "Visitor",
                "guest_email": "visitor@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["author"]["name"], "Visitor");
    assert!(body["data"]["author"].get("user_id").is_none());
}

#[tokio::test]
async fn test_authenticated_question_carries_account_author() {
    let app = spawn_app().await;
    let (user_id, token) = register_user(&app, "ada@example.com", "Ada").await;

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &token,
            serde_json::json!({ "title": "Scope 2 market-based", "content": "Which method?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["author"]["user_id"], user_id);
    assert_eq!(body["data"]["author"]["name"], "Ada");
}

#[tokio::test]
async fn test_list_questions_is_public_and_newest_first() {
    let app = spawn_app().await;
    let (_, token) = register_user(&app, "ada@example.com", "Ada").await;

    for title in ["First question", "Second question"] {
        let response = app
            .clone()
            .oneshot(post_authed(
                "/api/questions",
                &token,
                serde_json::json!({ "title": title, "content": "Details here" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/questions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let questions = body["data"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions[0]["id"].as_i64() > questions[1]["id"].as_i64());
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/questions/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_matches_title_and_content() {
    let app = spawn_app().await;
    let (_, token) = register_user(&app, "ada@example.com", "Ada").await;

    app.clone()
        .oneshot(post_authed(
            "/api/questions",
            &token,
            serde_json::json!({ "title": "Biodiversity reporting", "content": "TNFD details" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_authed(
            "/api/questions",
            &token,
            serde_json::json!({ "title": "Water usage", "content": "Mentions biodiversity too" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/questions/search?q=biodiversity")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_answers_attach_to_questions() {
    let app = spawn_app().await;
    let (_, token) = register_user(&app, "ada@example.com", "Ada").await;

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &token,
            serde_json::json!({ "title": "Offsetting quality", "content": "How to vet credits?" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let question_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/answers",
            serde_json::json!({
                "question_id": question_id,
                "content": "Look for third-party verification",
                "guest_name": "Consultant",
                "guest_email": "consultant@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/questions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    let question = &body["data"].as_array().unwrap()[0];
    assert_eq!(question["answers"].as_array().unwrap().len(), 1);
    assert_eq!(question["answers"][0]["author"]["name"], "Consultant");
}

#[tokio::test]
async fn test_answer_to_unknown_question_404s() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/answers",
            serde_json::json!({
                "question_id": 99999,
                "content": "Answering the void",
                "guest_name": "Visitor",
                "guest_email": "visitor@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_owner_or_admin() {
    let app = spawn_app().await;
    let (_, owner_token) = register_user(&app, "owner@example.com", "Owner").await;
    let (_, other_token) = register_user(&app, "other@example.com", "Other").await;

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &owner_token,
            serde_json::json!({ "title": "Delete me", "content": "Test content" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let question_id = body["data"]["id"].as_i64().unwrap();

    // Anonymous delete is unauthorized
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/questions/{question_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Another user is forbidden
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/questions/{question_id}"))
                .header("Authorization", format!("Bearer {other_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner may delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/questions/{question_id}"))
                .header("Authorization", format!("Bearer {owner_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone now
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/questions/{question_id}"))
                .header("Authorization", format!("Bearer {owner_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_can_delete_any_question() {
    let app = spawn_app().await;
    let (_, owner_token) = register_user(&app, "owner@example.com", "Owner").await;
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &owner_token,
            serde_json::json!({ "title": "Moderated away", "content": "Spam" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let question_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/questions/{question_id}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_banned_user_cannot_post() {
    let app = spawn_app().await;
    let (user_id, user_token) = register_user(&app, "member@example.com", "Member").await;
    let token = admin_token(&app).await;

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

    let response = app
        .clone()
        .oneshot(post_authed(
            "/api/questions",
            &user_token,
            serde_json::json!({ "title": "Still here?", "content": "Posting after ban" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_content_listings_serve_seeded_data() {
    let app = spawn_app().await;

    for uri in ["/api/articles", "/api/categories", "/api/resources"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(!body["data"].as_array().unwrap().is_empty(), "{uri}");
    }
}
