use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use marlin::config::Config;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "integration-secret";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.admin_email = ADMIN_EMAIL.to_string();
    config.auth.admin_password = ADMIN_PASSWORD.to_string();

    let state = marlin::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    marlin::api::router(state)
        .await
        .expect("Failed to build router")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn post_login(app: &Router, email: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "email": email, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn login_token(app: &Router) -> String {
    let response = post_login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

fn authed(method: &str, uri: &str, token: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_login_mints_token_and_resolves_identity() {
    let app = spawn_app().await;

    let response = post_login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert_eq!(body["data"]["user"]["email"], ADMIN_EMAIL);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/me", token, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = spawn_app().await;

    // Provision the admin row first so both failure paths hit a real table.
    login_token(&app).await;

    let wrong_password = post_login(&app, ADMIN_EMAIL, "nope").await;
    let unknown_email = post_login(&app, "ghost@example.com", "nope").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Identical error body: no user enumeration.
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_logout_revokes_token_and_is_idempotent() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/auth/logout", &token, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/me", &token, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out again with the dead token is still 200.
    let response = app
        .clone()
        .oneshot(authed("POST", "/api/auth/logout", &token, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_revokes_outstanding_tokens() {
    let app = spawn_app().await;
    let token = login_token(&app).await;
    let second_token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/auth/change-password",
            &token,
            Body::from(
                serde_json::json!({
                    "current_password": ADMIN_PASSWORD,
                    "new_password": "a-brand-new-secret",
                })
                .to_string(),
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Every token minted against the old credential is dead.
    for stale in [&token, &second_token] {
        let response = app
            .clone()
            .oneshot(authed("GET", "/api/auth/me", stale, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_login(&app, ADMIN_EMAIL, "a-brand-new-secret").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_validation() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    for (current, new) in [
        (ADMIN_PASSWORD, "short"),
        (ADMIN_PASSWORD, ADMIN_PASSWORD),
        ("wrong-current", "long-enough-password"),
    ] {
        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/auth/change-password",
                &token,
                Body::from(
                    serde_json::json!({ "current_password": current, "new_password": new })
                        .to_string(),
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_change_email() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/auth/change-email",
            &token,
            Body::from(serde_json::json!({ "new_email": "not-an-email" }).to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/auth/change-email",
            &token,
            Body::from(serde_json::json!({ "new_email": "new@example.com" }).to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "new@example.com");

    // The bearer token still resolves to the same identity.
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/auth/me", &token, Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "new@example.com");
}
